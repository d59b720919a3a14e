/// One structuring unit. `index` is the position in the original document,
/// used to keep results in document order.
#[derive(Debug, Clone)]
pub struct TextChunk {
    pub index: usize,
    pub text: String,
}

/// Greedy line packer. Lines are never split: a chunk closes when adding the
/// next line would exceed the budget, and a single over-budget line becomes
/// its own chunk.
pub struct ChunkPlanner {
    max_chars: usize,
}

impl ChunkPlanner {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn plan(&self, text: &str) -> Vec<TextChunk> {
        let mut chunks: Vec<TextChunk> = Vec::new();
        let mut current = String::new();

        for line in text.lines() {
            let needed = if current.is_empty() { line.len() } else { line.len() + 1 };
            if !current.is_empty() && current.len() + needed > self.max_chars {
                chunks.push(TextChunk { index: chunks.len(), text: std::mem::take(&mut current) });
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
        if !current.is_empty() {
            chunks.push(TextChunk { index: chunks.len(), text: current });
        }
        chunks
    }
}
