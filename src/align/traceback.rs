use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::matrix::{Direction, DpMatrix};
use super::{AlignMode, GAP};
use crate::error::{AlignError, Result};

/// 两条序列的比对结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// seq1 加入间隙后的比对行
    pub aligned1: Vec<u8>,
    /// seq2 加入间隙后的比对行，与 aligned1 等长
    pub aligned2: Vec<u8>,
    /// 回溯起点单元格的得分
    pub score: i32,
    /// seq1 上参与比对的区间 [seq1_start, seq1_end)
    pub seq1_start: usize,
    pub seq1_end: usize,
    /// seq2 上参与比对的区间 [seq2_start, seq2_end)
    pub seq2_start: usize,
    pub seq2_end: usize,
}

impl Alignment {
    #[inline]
    pub fn len(&self) -> usize {
        self.aligned1.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.aligned1.is_empty()
    }

    /// 每列的操作：M（两侧都有符号）、I（seq2 为间隙）、D（seq1 为间隙）
    pub fn ops(&self) -> Vec<char> {
        self.aligned1
            .iter()
            .zip(&self.aligned2)
            .map(|(&a, &b)| match (a == GAP, b == GAP) {
                (false, false) => 'M',
                (false, true) => 'I',
                _ => 'D',
            })
            .collect()
    }

    pub fn cigar(&self) -> String {
        ops_to_cigar(&self.ops())
    }

    /// 错配列数加间隙列数
    pub fn edit_distance(&self) -> u32 {
        self.aligned1
            .iter()
            .zip(&self.aligned2)
            .filter(|(a, b)| a != b)
            .count() as u32
    }

    pub fn identity(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let same = self.len() - self.edit_distance() as usize;
        same as f64 / self.len() as f64
    }
}

pub fn ops_to_cigar(ops: &[char]) -> String {
    let mut cigar = String::new();
    let Some((&first, rest)) = ops.split_first() else {
        return cigar;
    };
    let mut cur = first;
    let mut len = 1usize;
    for &op in rest {
        if op == cur {
            len += 1;
        } else {
            let _ = write!(&mut cigar, "{}{}", len, cur);
            cur = op;
            len = 1;
        }
    }
    let _ = write!(&mut cigar, "{}{}", len, cur);
    cigar
}

/// 沿方向矩阵回溯，重建两条比对行。
///
/// 全局模式从 (n, m) 出发，直到 (0, 0)；局部模式从全矩阵最大得分的单元格
/// 出发，遇到 Stop 或任一下标归零即结束。
///
/// 序列长度必须与建表时一致，否则返回 [`AlignError::MatrixShape`]。
pub fn reconstruct(matrix: &DpMatrix, seq1: &[u8], seq2: &[u8]) -> Result<Alignment> {
    if matrix.rows() != seq1.len() + 1 || matrix.cols() != seq2.len() + 1 {
        return Err(AlignError::MatrixShape {
            rows: matrix.rows(),
            cols: matrix.cols(),
            expected_rows: seq1.len() + 1,
            expected_cols: seq2.len() + 1,
        });
    }
    let mode = matrix.mode();
    let (mut i, mut j) = match mode {
        AlignMode::Global => (seq1.len(), seq2.len()),
        AlignMode::Local => matrix.max_cell(),
    };
    let score = matrix.score(i, j);
    let (seq1_end, seq2_end) = (i, j);

    let mut a1: Vec<u8> = Vec::with_capacity(i + j);
    let mut a2: Vec<u8> = Vec::with_capacity(i + j);

    loop {
        let done = match mode {
            AlignMode::Global => i == 0 && j == 0,
            AlignMode::Local => i == 0 || j == 0,
        };
        if done {
            break;
        }

        let mut dir = matrix.direction(i, j);
        if dir == Direction::Stop && mode == AlignMode::Local {
            break;
        }
        let legal = match dir {
            Direction::Diag => i > 0 && j > 0,
            Direction::Up => i > 0,
            Direction::Left => j > 0,
            Direction::Stop => false,
        };
        if !legal {
            // 正常填表不会出现；先消耗 seq1 再消耗 seq2，保证回溯终止
            dir = if i > 0 { Direction::Up } else { Direction::Left };
        }

        match dir {
            Direction::Diag => {
                a1.push(seq1[i - 1]);
                a2.push(seq2[j - 1]);
                i -= 1;
                j -= 1;
            }
            Direction::Up => {
                a1.push(seq1[i - 1]);
                a2.push(GAP);
                i -= 1;
            }
            Direction::Left | Direction::Stop => {
                a1.push(GAP);
                a2.push(seq2[j - 1]);
                j -= 1;
            }
        }
    }

    a1.reverse();
    a2.reverse();

    Ok(Alignment {
        aligned1: a1,
        aligned2: a2,
        score,
        seq1_start: i,
        seq1_end,
        seq2_start: j,
        seq2_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::scoring::ScoringScheme;
    use crate::util::alphabet::ungap;

    fn run(seq1: &[u8], seq2: &[u8], mode: AlignMode) -> Alignment {
        let scheme = ScoringScheme::dna(2, -3, -4);
        let m = DpMatrix::build(seq1, seq2, &scheme, mode).unwrap();
        reconstruct(&m, seq1, seq2).unwrap()
    }

    #[test]
    fn global_with_gap() {
        let aln = run(b"ACG", b"AG", AlignMode::Global);
        assert_eq!(aln.aligned1, b"ACG");
        assert_eq!(aln.aligned2, b"A-G");
        assert_eq!(aln.score, 0);
        assert_eq!(aln.cigar(), "1M1I1M");
        assert_eq!(aln.edit_distance(), 1);
        assert_eq!((aln.seq1_start, aln.seq1_end), (0, 3));
        assert_eq!((aln.seq2_start, aln.seq2_end), (0, 2));
    }

    #[test]
    fn global_identical() {
        let aln = run(b"ATGC", b"ATGC", AlignMode::Global);
        assert_eq!(aln.aligned1, b"ATGC");
        assert_eq!(aln.aligned2, b"ATGC");
        assert_eq!(aln.score, 8);
        assert_eq!(aln.cigar(), "4M");
        assert_eq!(aln.len(), 4);
        assert!((aln.identity() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn global_against_empty() {
        let aln = run(b"", b"ACG", AlignMode::Global);
        assert_eq!(aln.aligned1, b"---");
        assert_eq!(aln.aligned2, b"ACG");
        assert_eq!(aln.score, -12);

        let aln = run(b"AC", b"", AlignMode::Global);
        assert_eq!(aln.aligned1, b"AC");
        assert_eq!(aln.aligned2, b"--");
        assert_eq!(aln.cigar(), "2I");
    }

    #[test]
    fn local_best_substring() {
        let aln = run(b"ACGT", b"CG", AlignMode::Local);
        assert_eq!(aln.aligned1, b"CG");
        assert_eq!(aln.aligned2, b"CG");
        assert_eq!(aln.score, 4);
        assert_eq!((aln.seq1_start, aln.seq1_end), (1, 3));
        assert_eq!((aln.seq2_start, aln.seq2_end), (0, 2));
    }

    #[test]
    fn local_without_positive_cell_is_empty() {
        let aln = run(b"AAAA", b"TTTT", AlignMode::Local);
        assert!(aln.is_empty());
        assert_eq!(aln.score, 0);
        assert_eq!(aln.cigar(), "");
        assert_eq!(aln.identity(), 0.0);
    }

    #[test]
    fn local_rows_ungap_to_source_ranges() {
        let s1 = b"TTACGTACGGA";
        let s2 = b"CCACGTTCGGT";
        let aln = run(s1, s2, AlignMode::Local);
        assert_eq!(aln.aligned1.len(), aln.aligned2.len());
        assert_eq!(ungap(&aln.aligned1), &s1[aln.seq1_start..aln.seq1_end]);
        assert_eq!(ungap(&aln.aligned2), &s2[aln.seq2_start..aln.seq2_end]);
    }

    #[test]
    fn mismatched_sequences_are_rejected() {
        let scheme = ScoringScheme::dna(2, -3, -4);
        let m = DpMatrix::build(b"AC", b"AG", &scheme, AlignMode::Global).unwrap();
        let err = reconstruct(&m, b"ACGT", b"AG").unwrap_err();
        assert!(matches!(
            err,
            AlignError::MatrixShape { rows: 3, cols: 3, expected_rows: 5, expected_cols: 3 }
        ));
        assert!(reconstruct(&m, b"AC", b"").is_err());
    }

    #[test]
    fn global_stop_inside_matrix_falls_back() {
        // 3x3 全局矩阵，只有 (2,2) 为 Diag，其余包括内部 (1,1) 都是 Stop
        let mut dirs = vec![Direction::Stop; 9];
        dirs[2 * 3 + 2] = Direction::Diag;
        let mut scores = vec![0; 9];
        scores[2 * 3 + 2] = 5;
        let m = DpMatrix::from_parts(3, 3, AlignMode::Global, scores, dirs);

        let aln = reconstruct(&m, b"AC", b"GT").unwrap();
        // (1,1) 的 Stop 先消耗 seq1，再沿第 0 行消耗 seq2
        assert_eq!(aln.aligned1, b"A-C");
        assert_eq!(aln.aligned2, b"-GT");
        assert_eq!(aln.score, 5);
        assert_eq!((aln.seq1_start, aln.seq2_start), (0, 0));
        assert_eq!(ungap(&aln.aligned1), b"AC");
        assert_eq!(ungap(&aln.aligned2), b"GT");
    }

    #[test]
    fn global_all_stop_consumes_seq1_first() {
        let m = DpMatrix::from_parts(3, 3, AlignMode::Global, vec![0; 9], vec![Direction::Stop; 9]);
        let aln = reconstruct(&m, b"AC", b"GT").unwrap();
        assert_eq!(aln.aligned1, b"AC--");
        assert_eq!(aln.aligned2, b"--GT");
    }

    #[test]
    fn cigar_merges_runs() {
        assert_eq!(ops_to_cigar(&['M', 'M', 'I', 'D', 'D', 'M']), "2M1I2D1M");
        assert_eq!(ops_to_cigar(&[]), "");
    }
}
