use rayon::prelude::*;

use super::scoring::ScoringProvider;
use super::traceback::Alignment;
use super::{align_pair, AlignMode};
use crate::error::Result;

/// 并行比对多组互相独立的序列对，结果顺序与输入一致。
/// 单次 DP 填表内部不做并行。
pub fn align_pairs<S>(pairs: &[(&[u8], &[u8])], scoring: &S, mode: AlignMode) -> Vec<Result<Alignment>>
where
    S: ScoringProvider + Sync + ?Sized,
{
    pairs
        .par_iter()
        .map(|&(a, b)| align_pair(a, b, scoring, mode))
        .collect()
}

/// 所有无序序列对 (i, j)，i < j
#[derive(Debug)]
pub struct PairAlignment {
    pub i: usize,
    pub j: usize,
    pub result: Result<Alignment>,
}

/// 并行比对 `seqs` 中所有无序序列对，结果按 (i, j) 字典序返回
pub fn align_all_vs_all<S>(seqs: &[&[u8]], scoring: &S, mode: AlignMode) -> Vec<PairAlignment>
where
    S: ScoringProvider + Sync + ?Sized,
{
    let n = seqs.len();
    let idx_pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i + 1..n).map(move |j| (i, j))).collect();
    log::debug!("batch: {} sequences, {} pairs", n, idx_pairs.len());
    idx_pairs
        .into_par_iter()
        .map(|(i, j)| PairAlignment {
            i,
            j,
            result: align_pair(seqs[i], seqs[j], scoring, mode),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::scoring::ScoringScheme;
    use crate::error::AlignError;

    #[test]
    fn batch_matches_serial() {
        let scheme = ScoringScheme::dna(2, -3, -4);
        let pairs: [(&[u8], &[u8]); 4] = [
            (b"ACG", b"AG"),
            (b"ACGT", b"CG"),
            (b"ATGC", b"ATGC"),
            (b"", b"ACG"),
        ];
        for mode in [AlignMode::Global, AlignMode::Local] {
            let batch = align_pairs(&pairs, &scheme, mode);
            assert_eq!(batch.len(), pairs.len());
            for (res, &(a, b)) in batch.into_iter().zip(&pairs) {
                assert_eq!(res.unwrap(), align_pair(a, b, &scheme, mode).unwrap());
            }
        }
    }

    #[test]
    fn batch_keeps_errors_per_pair() {
        let scheme = ScoringScheme::dna(2, -3, -4);
        let pairs: [(&[u8], &[u8]); 2] = [(b"ACG", b"AG"), (b"ACG", b"MKV")];
        let batch = align_pairs(&pairs, &scheme, AlignMode::Global);
        assert!(batch[0].is_ok());
        assert!(matches!(batch[1], Err(AlignError::InvalidScoringPair { .. })));
    }

    #[test]
    fn all_vs_all_order() {
        let scheme = ScoringScheme::dna(2, -1, -2);
        let seqs: [&[u8]; 4] = [b"ACGT", b"ACG", b"CGT", b"AGT"];
        let res = align_all_vs_all(&seqs, &scheme, AlignMode::Global);
        let order: Vec<(usize, usize)> = res.iter().map(|p| (p.i, p.j)).collect();
        assert_eq!(order, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert!(res.iter().all(|p| p.result.is_ok()));
        assert!(align_all_vs_all(&seqs[..1], &scheme, AlignMode::Global).is_empty());
    }
}
