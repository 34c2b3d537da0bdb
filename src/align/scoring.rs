//! 打分方案：核酸 match/mismatch 与蛋白质替换矩阵（BLOSUM62）。
//!
//! 比对引擎只通过 [`ScoringProvider`] 查询分数，任何实现该 trait 的类型都可以
//! 作为打分来源。查不到的符号对一律视为输入错误，而不是按 0 分处理。

use crate::error::{AlignError, Result};
use crate::util::alphabet::{classify, SequenceKind};

pub trait ScoringProvider {
    /// 符号对的替换分数；未知符号对返回 `None`
    fn score(&self, a: u8, b: u8) -> Option<i32>;

    /// 线性间隙罚分，每个间隙符号计一次
    fn gap_penalty(&self) -> i32;

    #[inline]
    fn resolve(&self, a: u8, b: u8) -> Result<i32> {
        self.score(a, b).ok_or(AlignError::InvalidScoringPair {
            a: a as char,
            b: b as char,
        })
    }
}

const NO_INDEX: u8 = u8::MAX;

/// 对称替换矩阵，按字母表顺序行优先展平
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
    alphabet: Vec<u8>,
    index: Box<[u8; 256]>,
    scores: Vec<i32>,
}

impl SubstitutionTable {
    /// `scores` 按字母表顺序行优先展平，长度必须为 alphabet.len()²
    pub fn new(alphabet: &[u8], scores: Vec<i32>) -> Result<Self> {
        let n = alphabet.len();
        if n >= NO_INDEX as usize {
            return Err(AlignError::UnknownAlphabet(format!("alphabet has {n} symbols, at most 254 allowed")));
        }
        if scores.len() != n * n {
            return Err(AlignError::MalformedTable { expected: n * n, found: scores.len() });
        }
        Ok(Self::from_parts(alphabet, scores))
    }

    pub fn blosum62() -> Self {
        Self::from_parts(BLOSUM62_ALPHABET, BLOSUM62.iter().flatten().map(|&v| v as i32).collect())
    }

    fn from_parts(alphabet: &[u8], scores: Vec<i32>) -> Self {
        let mut index = Box::new([NO_INDEX; 256]);
        for (i, &sym) in alphabet.iter().enumerate() {
            index[sym as usize] = i as u8;
        }
        Self { alphabet: alphabet.to_vec(), index, scores }
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    #[inline]
    pub fn get(&self, a: u8, b: u8) -> Option<i32> {
        let ia = self.index[a as usize];
        let ib = self.index[b as usize];
        if ia == NO_INDEX || ib == NO_INDEX {
            return None;
        }
        Some(self.scores[ia as usize * self.alphabet.len() + ib as usize])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringScheme {
    /// 核酸打分：两个符号都属于 ACGTU 时才可解析
    Nucleotide {
        match_score: i32,
        mismatch_score: i32,
        gap_penalty: i32,
    },
    /// 蛋白质替换矩阵
    Substitution {
        table: SubstitutionTable,
        gap_penalty: i32,
    },
}

impl ScoringScheme {
    pub fn dna(match_score: i32, mismatch_score: i32, gap_penalty: i32) -> Self {
        ScoringScheme::Nucleotide { match_score, mismatch_score, gap_penalty }
    }

    pub fn blosum62(gap_penalty: i32) -> Self {
        ScoringScheme::Substitution { table: SubstitutionTable::blosum62(), gap_penalty }
    }

    /// 按输入序列的字母表选择打分方案：全部为 DNA/RNA 时用核酸打分，
    /// 全部为蛋白质时用 BLOSUM62，否则报错
    pub fn auto(seqs: &[&[u8]], match_score: i32, mismatch_score: i32, gap_penalty: i32) -> Result<Self> {
        let kinds: Vec<SequenceKind> = seqs
            .iter()
            .copied()
            .filter(|s| !s.is_empty())
            .map(classify)
            .collect();
        if kinds.is_empty() {
            return Err(AlignError::UnknownAlphabet("no non-empty sequence to classify".into()));
        }
        if let Some(pos) = kinds.iter().position(|&k| k == SequenceKind::Unknown) {
            return Err(AlignError::UnknownAlphabet(format!("sequence {} has unrecognised symbols", pos + 1)));
        }
        if kinds.iter().all(|k| k.is_nucleotide()) {
            log::debug!("scoring: nucleotide match={} mismatch={} gap={}", match_score, mismatch_score, gap_penalty);
            Ok(Self::dna(match_score, mismatch_score, gap_penalty))
        } else if kinds.iter().all(|&k| k == SequenceKind::Protein) {
            log::debug!("scoring: BLOSUM62 gap={}", gap_penalty);
            Ok(Self::blosum62(gap_penalty))
        } else {
            Err(AlignError::UnknownAlphabet("incompatible sequence types (nucleotide vs protein)".into()))
        }
    }
}

#[inline]
fn is_nucleotide_symbol(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T' | b'U')
}

impl ScoringProvider for ScoringScheme {
    #[inline]
    fn score(&self, a: u8, b: u8) -> Option<i32> {
        match self {
            ScoringScheme::Nucleotide { match_score, mismatch_score, .. } => {
                if !is_nucleotide_symbol(a) || !is_nucleotide_symbol(b) {
                    None
                } else if a == b {
                    Some(*match_score)
                } else {
                    Some(*mismatch_score)
                }
            }
            ScoringScheme::Substitution { table, .. } => table.get(a, b),
        }
    }

    #[inline]
    fn gap_penalty(&self) -> i32 {
        match self {
            ScoringScheme::Nucleotide { gap_penalty, .. } => *gap_penalty,
            ScoringScheme::Substitution { gap_penalty, .. } => *gap_penalty,
        }
    }
}

impl<T: ScoringProvider + ?Sized> ScoringProvider for &T {
    #[inline]
    fn score(&self, a: u8, b: u8) -> Option<i32> {
        (**self).score(a, b)
    }

    #[inline]
    fn gap_penalty(&self) -> i32 {
        (**self).gap_penalty()
    }
}

const BLOSUM62_ALPHABET: &[u8] = b"ARNDCQEGHILKMFPSTWYVBZX*";

#[rustfmt::skip]
const BLOSUM62: [[i8; 24]; 24] = [
    //A   R   N   D   C   Q   E   G   H   I   L   K   M   F   P   S   T   W   Y   V   B   Z   X   *
    [ 4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1,  0, -4], // A
    [-1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1,  0, -1, -4], // R
    [-2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  3,  0, -1, -4], // N
    [-2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4,  1, -1, -4], // D
    [ 0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -3, -2, -4], // C
    [-1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0,  3, -1, -4], // Q
    [-1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4], // E
    [ 0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -2, -1, -4], // G
    [-2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0,  0, -1, -4], // H
    [-1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3, -3, -1, -4], // I
    [-1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4, -3, -1, -4], // L
    [-1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0,  1, -1, -4], // K
    [-1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3, -1, -1, -4], // M
    [-2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3, -3, -1, -4], // F
    [-1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -1, -2, -4], // P
    [ 1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0,  0,  0, -4], // S
    [ 0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1,  0, -4], // T
    [-3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -3, -2, -4], // W
    [-2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -2, -1, -4], // Y
    [ 0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3, -2, -1, -4], // V
    [-2, -1,  3,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4,  1, -1, -4], // B
    [-1,  0,  0,  1, -3,  3,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -3, -2, -2,  1,  4, -1, -4], // Z
    [ 0, -1, -1, -1, -2, -1, -1, -1, -1, -1, -1, -1, -1, -1, -2,  0,  0, -2, -1, -1, -1, -1, -1, -4], // X
    [-4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1], // *
];
