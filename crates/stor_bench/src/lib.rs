//! Benchmark utilities.

#![warn(missing_docs)]

use rand::Rng;

/// Generate random blob data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate `count` distinct blob paths spread over `depth` directory levels.
pub fn generate_paths(count: usize, depth: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let mut segments: Vec<String> = (0..depth)
                .map(|level| format!("dir{}", (i >> (level * 2)) % 4))
                .collect();
            segments.push(format!("blob_{i}"));
            segments.join("/")
        })
        .collect()
}
