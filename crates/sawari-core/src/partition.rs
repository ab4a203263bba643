//! Deterministic job partitioning: contiguous, even shards so retries and
//! the final report can be reproduced and indexed consistently.

use crate::joblist::JobDescriptor;

/// Splits `locators` into at most `workers` contiguous shards of size
/// ⌈M/N⌉ (the last shard may be shorter). Every job lands in exactly one
/// shard; trailing shards may be empty when M < N and are dropped.
pub fn make_shards(locators: &[String], workers: usize) -> Vec<Vec<JobDescriptor>> {
    let jobs: Vec<(usize, &str)> = locators.iter().map(String::as_str).enumerate().collect();
    shard_indexed(&jobs, workers)
}

/// Re-shards the failed subset for a retry round, keeping each job's
/// original index. Shard count is `min(workers, remaining)`.
pub fn reshard(failed: &[(usize, String)], workers: usize) -> Vec<Vec<JobDescriptor>> {
    let jobs: Vec<(usize, &str)> = failed.iter().map(|(i, l)| (*i, l.as_str())).collect();
    let n = workers.min(jobs.len()).max(1);
    shard_indexed(&jobs, n)
}

fn shard_indexed(jobs: &[(usize, &str)], workers: usize) -> Vec<Vec<JobDescriptor>> {
    if jobs.is_empty() {
        return Vec::new();
    }
    let workers = workers.max(1);
    let per_shard = jobs.len().div_ceil(workers);

    let mut shards = Vec::with_capacity(workers);
    for (shard_id, chunk) in jobs.chunks(per_shard).enumerate() {
        shards.push(
            chunk
                .iter()
                .map(|&(index, locator)| JobDescriptor {
                    index,
                    locator: locator.to_owned(),
                    shard_id,
                })
                .collect(),
        );
    }
    shards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locators(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://x.example/{i}")).collect()
    }

    #[test]
    fn shards_partition_exactly() {
        let input = locators(23);
        let shards = make_shards(&input, 6);
        let sizes: Vec<usize> = shards.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 4, 4, 4, 3]);

        // Disjoint union equals the full job set, in order.
        let mut all: Vec<usize> = shards.iter().flatten().map(|j| j.index).collect();
        all.sort_unstable();
        assert_eq!(all, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn shards_are_contiguous() {
        let shards = make_shards(&locators(10), 3);
        for shard in &shards {
            for pair in shard.windows(2) {
                assert_eq!(pair[1].index, pair[0].index + 1);
            }
        }
    }

    #[test]
    fn fewer_jobs_than_workers() {
        let shards = make_shards(&locators(2), 6);
        assert_eq!(shards.len(), 2);
        assert!(shards.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn empty_input_yields_no_shards() {
        let shards = make_shards(&[], 4);
        assert!(shards.is_empty());
    }

    #[test]
    fn partition_is_deterministic() {
        let input = locators(17);
        assert_eq!(make_shards(&input, 5), make_shards(&input, 5));
    }

    #[test]
    fn reshard_keeps_original_indexes() {
        let failed = vec![
            (4, "https://x.example/4".to_string()),
            (7, "https://x.example/7".to_string()),
            (9, "https://x.example/9".to_string()),
        ];
        let shards = reshard(&failed, 6);
        // min(6, 3) = 3 shards of one job each.
        assert_eq!(shards.len(), 3);
        let indexes: Vec<usize> = shards.iter().flatten().map(|j| j.index).collect();
        assert_eq!(indexes, vec![4, 7, 9]);
    }
}
