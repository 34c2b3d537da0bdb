//! 渐进式多序列比对（星形比对近似）。
//!
//! 以第一条序列为种子，之后每加入一条序列：
//! 1. 按列多数表决求共识序列（并列时取按行顺序最先出现的符号）；
//! 2. 共识序列与新序列做全局比对；
//! 3. 共识比对行中每个间隙都在已有各行的对应位置插入一整列间隙；
//! 4. 追加新序列的比对行。
//!
//! 这不是最优多序列比对，结果依赖输入顺序与上述并列规则。

use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::matrix::DpMatrix;
use super::scoring::ScoringProvider;
use super::traceback::reconstruct;
use super::{AlignMode, GAP};
use crate::error::{AlignError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleAlignment {
    rows: Vec<Vec<u8>>,
}

impl MultipleAlignment {
    /// 以单条序列作为唯一一行初始化
    pub fn new(first: &[u8]) -> Self {
        Self { rows: vec![first.to_vec()] }
    }

    /// 包装已比对好的各行，所有行必须等长
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let expected = rows.first().ok_or(AlignError::EmptyInput)?.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(AlignError::RaggedRows { expected, found: r.len(), row });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[u8]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn n_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn column(&self, col: usize) -> Option<Vec<u8>> {
        if col >= self.n_columns() {
            return None;
        }
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    /// 每列取非间隙符号中出现次数最多者
    pub fn consensus(&self) -> Result<Vec<u8>> {
        (0..self.n_columns())
            .map(|col| {
                consensus_symbol(self.rows.iter().map(|r| r[col])).ok_or(AlignError::GapOnlyColumn { column: col })
            })
            .collect()
    }

    /// 无间隙且所有行符号一致的列所占比例
    pub fn conservation(&self) -> f64 {
        let width = self.n_columns();
        if width == 0 {
            return 0.0;
        }
        let conserved = (0..width)
            .filter(|&c| {
                let first = self.rows[0][c];
                first != GAP && self.rows.iter().all(|r| r[c] == first)
            })
            .count();
        conserved as f64 / width as f64
    }

    /// 渐进式比对的一步：新序列与当前共识做全局比对后追加为新行，
    /// 必要时在已有各行中插入间隙列
    pub fn add_sequence<S>(&mut self, seq: &[u8], scoring: &S) -> Result<()>
    where
        S: ScoringProvider + ?Sized,
    {
        let consensus = self.consensus()?;
        let matrix = DpMatrix::build(&consensus, seq, scoring, AlignMode::Global)?;
        let aln = reconstruct(&matrix, &consensus, seq)?;

        self.expand_rows(&aln.aligned1);
        self.rows.push(aln.aligned2);

        debug_assert!(self.rows.iter().all(|r| r.len() == self.n_columns()));
        log::debug!(
            "msa: added row {} (len {}), {} columns, consensus score {}",
            self.rows.len(),
            seq.len(),
            self.n_columns(),
            aln.score
        );
        Ok(())
    }

    /// 按比对后的共识行扩展已有各行：间隙处插入整列间隙，其余位置按原列顺序取用
    fn expand_rows(&mut self, consensus_aligned: &[u8]) {
        let width = consensus_aligned.len();
        for row in &mut self.rows {
            let mut out = Vec::with_capacity(width);
            let mut src = 0usize;
            for &c in consensus_aligned {
                if c == GAP {
                    out.push(GAP);
                } else {
                    out.push(row[src]);
                    src += 1;
                }
            }
            debug_assert_eq!(src, row.len());
            *row = out;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let f = std::fs::File::create(path)?;
        let mut w = BufWriter::new(f);
        bincode::serialize_into(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let msa: Self = bincode::deserialize_from(BufReader::new(f))?;
        // 快照可能被篡改，重新检查行长一致
        Self::from_rows(msa.rows)
    }
}

/// 单列的多数符号（忽略间隙），并列时取按行顺序最先出现者；
/// 整列都是间隙时返回 `None`
pub fn consensus_symbol<I: IntoIterator<Item = u8>>(column: I) -> Option<u8> {
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for sym in column {
        if sym == GAP {
            continue;
        }
        match counts.iter_mut().find(|(s, _)| *s == sym) {
            Some((_, n)) => *n += 1,
            None => counts.push((sym, 1)),
        }
    }
    let mut best: Option<(u8, usize)> = None;
    for &(sym, n) in &counts {
        if best.map_or(true, |(_, bn)| n > bn) {
            best = Some((sym, n));
        }
    }
    best.map(|(sym, _)| sym)
}

/// 对输入序列按顺序做渐进式比对
pub fn align_many<S>(sequences: &[&[u8]], scoring: &S) -> Result<MultipleAlignment>
where
    S: ScoringProvider + ?Sized,
{
    let (first, rest) = sequences.split_first().ok_or(AlignError::EmptyInput)?;
    let mut msa = MultipleAlignment::new(first);
    for seq in rest {
        msa.add_sequence(seq, scoring)?;
    }
    log::debug!("msa: {} rows x {} columns", msa.n_rows(), msa.n_columns());
    Ok(msa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::scoring::ScoringScheme;
    use crate::util::alphabet::ungap;

    fn dna() -> ScoringScheme {
        ScoringScheme::dna(2, -1, -2)
    }

    #[test]
    fn consensus_majority() {
        let msa = MultipleAlignment::from_rows(vec![b"ACG".to_vec(), b"A-G".to_vec(), b"ACG".to_vec()]).unwrap();
        assert_eq!(msa.consensus().unwrap(), b"ACG");
    }

    #[test]
    fn consensus_tie_takes_first_seen() {
        assert_eq!(consensus_symbol(b"TCCT".iter().copied()), Some(b'T'));
        assert_eq!(consensus_symbol(b"-GA".iter().copied()), Some(b'G'));
        assert_eq!(consensus_symbol(b"-AGG".iter().copied()), Some(b'G'));
        assert_eq!(consensus_symbol(b"---".iter().copied()), None);
    }

    #[test]
    fn consensus_gap_only_column_errors() {
        let msa = MultipleAlignment::from_rows(vec![b"A-".to_vec(), b"C-".to_vec()]).unwrap();
        assert!(matches!(msa.consensus(), Err(AlignError::GapOnlyColumn { column: 1 })));
    }

    #[test]
    fn from_rows_rejects_ragged_and_empty() {
        let err = MultipleAlignment::from_rows(vec![b"ACG".to_vec(), b"AC".to_vec()]).unwrap_err();
        assert!(matches!(err, AlignError::RaggedRows { expected: 3, found: 2, row: 1 }));
        assert!(matches!(MultipleAlignment::from_rows(Vec::new()), Err(AlignError::EmptyInput)));
    }

    #[test]
    fn add_sequence_inserts_gap_columns() {
        let mut msa = MultipleAlignment::from_rows(vec![b"ACG".to_vec(), b"A-C".to_vec()]).unwrap();
        msa.add_sequence(b"AG", &dna()).unwrap();
        assert_eq!(msa.n_rows(), 3);
        assert!(msa.rows().iter().all(|r| r.len() == msa.n_columns()));
        assert_eq!(ungap(msa.row(2).unwrap()), b"AG");
    }

    #[test]
    fn progressive_three_sequences() {
        let seqs: [&[u8]; 3] = [b"ACG", b"AC", b"AG"];
        let msa = align_many(&seqs, &dna()).unwrap();
        assert_eq!(msa.rows(), &[b"ACG".to_vec(), b"AC-".to_vec(), b"A-G".to_vec()]);
        for (row, seq) in msa.rows().iter().zip(seqs) {
            assert_eq!(ungap(row), seq);
        }
    }

    #[test]
    fn progressive_widens_earlier_rows() {
        let seqs: [&[u8]; 2] = [b"AC", b"AGC"];
        let msa = align_many(&seqs, &dna()).unwrap();
        assert_eq!(msa.n_columns(), 3);
        assert_eq!(msa.rows(), &[b"A-C".to_vec(), b"AGC".to_vec()]);
    }

    #[test]
    fn progressive_single_sequence_is_identity() {
        let seqs: [&[u8]; 1] = [b"ACGT"];
        let msa = align_many(&seqs, &dna()).unwrap();
        assert_eq!(msa.rows(), &[b"ACGT".to_vec()]);
    }

    #[test]
    fn progressive_empty_input() {
        assert!(matches!(align_many(&[], &dna()), Err(AlignError::EmptyInput)));
    }

    #[test]
    fn progressive_empty_first_sequence() {
        let seqs: [&[u8]; 2] = [b"", b"ACG"];
        let msa = align_many(&seqs, &dna()).unwrap();
        assert_eq!(msa.rows(), &[b"---".to_vec(), b"ACG".to_vec()]);
    }

    #[test]
    fn column_and_conservation() {
        let msa = MultipleAlignment::from_rows(vec![b"ACG".to_vec(), b"AC-".to_vec(), b"A-G".to_vec()]).unwrap();
        assert_eq!(msa.column(0), Some(b"AAA".to_vec()));
        assert_eq!(msa.column(1), Some(b"CC-".to_vec()));
        assert_eq!(msa.column(3), None);
        assert!((msa.conservation() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn snapshot_round_trip() {
        let seqs: [&[u8]; 3] = [b"ACGT", b"AGT", b"ACCGT"];
        let msa = align_many(&seqs, &dna()).unwrap();
        let path = std::env::temp_dir().join(format!("seq_align_msa_{}.bin", std::process::id()));
        msa.save_to_file(&path).unwrap();
        let loaded = MultipleAlignment::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, msa);
    }
}
