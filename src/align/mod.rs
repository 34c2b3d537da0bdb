pub mod batch;
pub mod dotplot;
pub mod matrix;
pub mod msa;
pub mod scoring;
pub mod traceback;

pub use batch::{align_all_vs_all, align_pairs, PairAlignment};
pub use dotplot::DotPlot;
pub use matrix::{best_move, Direction, DpMatrix};
pub use msa::{align_many, MultipleAlignment};
pub use scoring::{ScoringProvider, ScoringScheme, SubstitutionTable};
pub use traceback::{reconstruct, Alignment};

use crate::error::Result;

/// 比对行中的间隙符号
pub const GAP: u8 = b'-';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignMode {
    /// Needleman-Wunsch，覆盖两条序列全长
    Global,
    /// Smith-Waterman，只比对得分最高的连续子串
    Local,
}

/// 填表 + 回溯，矩阵在返回前释放
pub fn align_pair<S>(seq1: &[u8], seq2: &[u8], scoring: &S, mode: AlignMode) -> Result<Alignment>
where
    S: ScoringProvider + ?Sized,
{
    let matrix = DpMatrix::build(seq1, seq2, scoring, mode)?;
    reconstruct(&matrix, seq1, seq2)
}

pub fn align_global<S>(seq1: &[u8], seq2: &[u8], scoring: &S) -> Result<Alignment>
where
    S: ScoringProvider + ?Sized,
{
    align_pair(seq1, seq2, scoring, AlignMode::Global)
}

pub fn align_local<S>(seq1: &[u8], seq2: &[u8], scoring: &S) -> Result<Alignment>
where
    S: ScoringProvider + ?Sized,
{
    align_pair(seq1, seq2, scoring, AlignMode::Local)
}

pub fn align_progressive<S>(sequences: &[&[u8]], scoring: &S) -> Result<MultipleAlignment>
where
    S: ScoringProvider + ?Sized,
{
    align_many(sequences, scoring)
}

/// 打分矩阵选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum MatrixChoice {
    /// 根据输入序列类型自动选择
    #[default]
    Auto,
    Dna,
    Blosum62,
}

/// 比对参数（来自命令行）
#[derive(Debug, Clone, Copy)]
pub struct AlignOpt {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_penalty: i32,
    pub matrix: MatrixChoice,
    pub threads: usize,
}

impl Default for AlignOpt {
    fn default() -> Self {
        Self {
            match_score: 2,
            mismatch_score: -3,
            gap_penalty: -4,
            matrix: MatrixChoice::Auto,
            threads: 1,
        }
    }
}

impl AlignOpt {
    /// 根据输入序列解析出打分方案
    pub fn scoring(&self, seqs: &[&[u8]]) -> Result<ScoringScheme> {
        match self.matrix {
            MatrixChoice::Auto => ScoringScheme::auto(seqs, self.match_score, self.mismatch_score, self.gap_penalty),
            MatrixChoice::Dna => Ok(ScoringScheme::dna(self.match_score, self.mismatch_score, self.gap_penalty)),
            MatrixChoice::Blosum62 => Ok(ScoringScheme::blosum62(self.gap_penalty)),
        }
    }
}
