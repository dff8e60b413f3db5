//! Multi-line batch tokenization across worker threads.
//!
//! The analyzer holds only read-only views into the loaded artifacts, so
//! workers share it by reference: lines are dealt out in disjoint
//! contiguous ranges and every worker appends into its own output slots.

use crate::tokenizer::{OutputMode, Tokenizer};

impl Tokenizer {
    /// Tokenizes every line of `text` in parallel, returning the
    /// concatenated per-line analyses in input order.
    ///
    /// `num_threads == 0` uses all available cores.
    pub fn tokenize_batch(&self, text: &str, mode: OutputMode, num_threads: usize) -> Vec<u8> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return vec![];
        }
        let num_threads = if num_threads == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            num_threads
        };
        let num_threads = num_threads.min(lines.len());
        let chunk_len = (lines.len() + num_threads - 1) / num_threads;
        let mut slots: Vec<Vec<u8>> = vec![vec![]; lines.len()];

        std::thread::scope(|scope| {
            for (line_chunk, slot_chunk) in lines.chunks(chunk_len).zip(slots.chunks_mut(chunk_len))
            {
                scope.spawn(move || {
                    for (line, slot) in line_chunk.iter().zip(slot_chunk.iter_mut()) {
                        self.tokenize_line_into(line.as_bytes(), mode, slot);
                    }
                });
            }
        });

        slots.concat()
    }
}
