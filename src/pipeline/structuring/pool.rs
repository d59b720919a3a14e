use std::sync::atomic::{AtomicUsize, Ordering};

use super::client::StructuringClient;
use super::parser::parse_payload;
use super::types::ChunkPayload;
use super::StructuringError;

/// Run structuring over all prompts on a bounded pool of scoped threads.
/// Workers pull indices from a shared counter; results are reassembled in
/// chunk order so the flattened transaction list is stable for a given run.
pub fn structure_chunks(
    client: &dyn StructuringClient,
    prompts: &[String],
    max_in_flight: usize,
) -> Vec<Result<ChunkPayload, StructuringError>> {
    if prompts.is_empty() {
        return Vec::new();
    }

    let next = AtomicUsize::new(0);
    let workers = max_in_flight.clamp(1, prompts.len());

    let mut slots: Vec<Option<Result<ChunkPayload, StructuringError>>> =
        std::iter::repeat_with(|| None).take(prompts.len()).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut local = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        if i >= prompts.len() {
                            break;
                        }
                        let outcome =
                            client.generate(&prompts[i]).and_then(|raw| parse_payload(&raw));
                        if let Err(e) = &outcome {
                            tracing::warn!(chunk_index = i, error = %e, "chunk structuring failed");
                        }
                        local.push((i, outcome));
                    }
                    local
                })
            })
            .collect();

        for handle in handles {
            if let Ok(local) = handle.join() {
                for (i, outcome) in local {
                    slots[i] = Some(outcome);
                }
            }
        }
    });

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(StructuringError::HttpClient("worker exited before finishing chunk".into()))
            })
        })
        .collect()
}
