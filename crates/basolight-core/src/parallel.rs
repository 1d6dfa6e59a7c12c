//! Parallelization helpers for pixel processing
//!
//! Per-pixel classification has no cross-pixel data dependency, so the grid
//! can be partitioned across rayon workers with each worker owning a
//! disjoint chunk. The helper dispatches between parallel and sequential
//! execution based on image size.

use rayon::prelude::*;

/// Minimum number of pixels to trigger parallel processing.
pub const PARALLEL_THRESHOLD: usize = 30_000;

/// Fold over mutable chunks with automatic threshold-based dispatch.
///
/// Each chunk is one RGB pixel; the accumulator collects per-worker verdict
/// tallies which are then reduced. Workers write only their own chunks, so
/// no coordination is needed.
pub fn fold_chunks_mut<T, A, I, F, R>(
    data: &mut [T],
    chunk_size: usize,
    init: I,
    fold_fn: F,
    reduce_fn: R,
) -> A
where
    T: Send,
    A: Send,
    I: Fn() -> A + Sync + Send,
    F: Fn(A, &mut [T]) -> A + Sync + Send,
    R: Fn(A, A) -> A + Sync + Send,
{
    let num_elements = data.len() / chunk_size;

    if num_elements >= PARALLEL_THRESHOLD {
        data.par_chunks_exact_mut(chunk_size)
            .fold(&init, &fold_fn)
            .reduce(&init, &reduce_fn)
    } else {
        let mut acc = init();
        for chunk in data.chunks_exact_mut(chunk_size) {
            acc = fold_fn(acc, chunk);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_chunks_mut_small() {
        // Small dataset - sequential path. Double every channel and count
        // pixels whose red started above 2.
        let mut data: Vec<u8> = vec![1, 2, 3, 4, 5, 6];

        let count = fold_chunks_mut(
            &mut data,
            3,
            || 0u64,
            |acc, pixel| {
                let bright = pixel[0] > 2;
                for value in pixel.iter_mut() {
                    *value *= 2;
                }
                acc + bright as u64
            },
            |a, b| a + b,
        );

        assert_eq!(count, 1);
        assert_eq!(data, vec![2, 4, 6, 8, 10, 12]);
    }

    #[test]
    fn test_fold_chunks_mut_large() {
        // Large dataset - parallel path.
        let num_pixels = PARALLEL_THRESHOLD + 1000;
        let mut data: Vec<u8> = vec![100; num_pixels * 3];

        let count = fold_chunks_mut(
            &mut data,
            3,
            || 0u64,
            |acc, pixel| {
                pixel[0] = pixel[0].saturating_add(10);
                acc + 1
            },
            |a, b| a + b,
        );

        assert_eq!(count, num_pixels as u64);
        assert!(data.chunks_exact(3).all(|px| px[0] == 110 && px[1] == 100));
    }

}
