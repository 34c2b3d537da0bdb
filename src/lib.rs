//! # seq-align
//!
//! 基于动态规划的生物序列比对库（DNA / RNA / 蛋白质）。
//!
//! - **全局比对**：Needleman-Wunsch，覆盖两条序列全长
//! - **局部比对**：Smith-Waterman，找出得分最高的连续子串
//! - **渐进式多序列比对**：逐条将新序列与当前共识序列做全局比对
//! - **批量比对**：用 rayon 并行处理互相独立的序列对
//! - **点阵图**：滑动窗口 + stringency 的序列自比/互比点阵
//!
//! ## 快速示例
//!
//! ```rust
//! use seq_align::align::{self, ScoringScheme};
//!
//! let scoring = ScoringScheme::dna(2, -3, -4);
//! let aln = align::align_global(b"ACG", b"AG", &scoring).unwrap();
//! assert_eq!(aln.aligned1, b"ACG");
//! assert_eq!(aln.aligned2, b"A-G");
//!
//! let seqs: [&[u8]; 3] = [b"ACG", b"AC", b"AG"];
//! let msa = align::align_progressive(&seqs, &ScoringScheme::dna(2, -1, -2)).unwrap();
//! assert_eq!(msa.n_rows(), 3);
//! ```
//!
//! ## 模块说明
//!
//! - [`align`] — 打分、DP 填表、回溯、多序列比对与批量比对
//! - [`io`] — FASTA 文件解析
//! - [`util`] — 序列类型判断、规范化、去间隙
//! - [`error`] — 错误类型

pub mod align;
pub mod error;
pub mod io;
pub mod util;

pub use error::{AlignError, Result};
