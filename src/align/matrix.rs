use std::fmt::Write as _;

use super::scoring::ScoringProvider;
use super::AlignMode;
use crate::error::Result;

/// 回溯方向，每个单元格记录填表时选中的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Diag,
    Up,
    Left,
    Stop,
}

impl Direction {
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::Diag => "↖",
            Direction::Up => "↑",
            Direction::Left => "←",
            Direction::Stop => "·",
        }
    }
}

/// 三个候选来源取最大；并列时固定按 diag > up > left 的顺序选择，
/// 回溯路径依赖此顺序
#[inline]
pub fn best_move(diag: i32, up: i32, left: i32) -> (i32, Direction) {
    let best = diag.max(up).max(left);
    if best == diag {
        (best, Direction::Diag)
    } else if best == up {
        (best, Direction::Up)
    } else {
        (best, Direction::Left)
    }
}

/// 得分矩阵与方向矩阵，(n+1)×(m+1)，行优先展平存储。
/// 每次比对调用都新建一份，回溯完成后即丢弃。
/// 分数累加使用饱和加法，极端罚分不会溢出回绕。
#[derive(Debug, Clone)]
pub struct DpMatrix {
    rows: usize,
    cols: usize,
    mode: AlignMode,
    scores: Vec<i32>,
    dirs: Vec<Direction>,
}

impl DpMatrix {
    pub fn build<S>(seq1: &[u8], seq2: &[u8], scoring: &S, mode: AlignMode) -> Result<Self>
    where
        S: ScoringProvider + ?Sized,
    {
        let n = seq1.len();
        let m = seq2.len();
        let rows = n + 1;
        let cols = m + 1;
        let gap = scoring.gap_penalty();

        let mut scores = vec![0i32; rows * cols];
        let mut dirs = vec![Direction::Stop; rows * cols];

        // 局部模式边界全部为 0 / Stop，无需额外初始化
        if mode == AlignMode::Global {
            for j in 1..cols {
                scores[j] = scores[j - 1].saturating_add(gap);
                dirs[j] = Direction::Left;
            }
            for i in 1..rows {
                scores[i * cols] = scores[(i - 1) * cols].saturating_add(gap);
                dirs[i * cols] = Direction::Up;
            }
        }

        for i in 1..rows {
            let a = seq1[i - 1];
            for j in 1..cols {
                let idx = i * cols + j;
                let up_idx = (i - 1) * cols + j;
                let left_idx = idx - 1;
                let diag_idx = up_idx - 1;

                let diag = scores[diag_idx].saturating_add(scoring.resolve(a, seq2[j - 1])?);
                let up = scores[up_idx].saturating_add(gap);
                let left = scores[left_idx].saturating_add(gap);

                let (val, dir) = best_move(diag, up, left);
                let (val, dir) = match mode {
                    AlignMode::Global => (val, dir),
                    AlignMode::Local if val <= 0 => (0, Direction::Stop),
                    AlignMode::Local => (val, dir),
                };
                scores[idx] = val;
                dirs[idx] = dir;
            }
        }

        log::trace!("dp fill: {}x{} cells, mode={:?}", rows, cols, mode);
        Ok(Self { rows, cols, mode, scores, dirs })
    }

    /// 直接由分数与方向构造矩阵，用于回溯的边界情况测试
    #[cfg(test)]
    pub(crate) fn from_parts(rows: usize, cols: usize, mode: AlignMode, scores: Vec<i32>, dirs: Vec<Direction>) -> Self {
        assert_eq!(scores.len(), rows * cols);
        assert_eq!(dirs.len(), rows * cols);
        Self { rows, cols, mode, scores, dirs }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn mode(&self) -> AlignMode {
        self.mode
    }

    #[inline]
    pub fn score(&self, i: usize, j: usize) -> i32 {
        self.scores[i * self.cols + j]
    }

    #[inline]
    pub fn direction(&self, i: usize, j: usize) -> Direction {
        self.dirs[i * self.cols + j]
    }

    /// 整个矩阵中最大得分的单元格；并列时取行优先扫描的第一个
    pub fn max_cell(&self) -> (usize, usize) {
        let mut best = 0usize;
        for (idx, &v) in self.scores.iter().enumerate() {
            if v > self.scores[best] {
                best = idx;
            }
        }
        (best / self.cols, best % self.cols)
    }

    /// 得分矩阵文本：seq2 横排在顶部，seq1 竖排在左侧
    pub fn render_scores(&self, seq1: &[u8], seq2: &[u8]) -> String {
        self.render(seq1, seq2, |i, j| self.score(i, j).to_string())
    }

    pub fn render_directions(&self, seq1: &[u8], seq2: &[u8]) -> String {
        self.render(seq1, seq2, |i, j| self.direction(i, j).symbol().to_string())
    }

    fn render<F: Fn(usize, usize) -> String>(&self, seq1: &[u8], seq2: &[u8], cell: F) -> String {
        let width = (0..self.rows)
            .flat_map(|i| (0..self.cols).map(move |j| (i, j)))
            .map(|(i, j)| cell(i, j).chars().count())
            .max()
            .unwrap_or(1)
            .max(1);

        let mut out = String::new();
        let _ = write!(out, "{:>w$}", "", w = width + 1);
        let _ = write!(out, " {:>w$}", "", w = width);
        for &b in seq2 {
            let _ = write!(out, " {:>w$}", b as char, w = width);
        }
        out.push('\n');
        for i in 0..self.rows {
            let label = if i == 0 { ' ' } else { seq1[i - 1] as char };
            let _ = write!(out, "{:>w$}", label, w = width + 1);
            for j in 0..self.cols {
                let _ = write!(out, " {:>w$}", cell(i, j), w = width);
            }
            out.push('\n');
        }
        out
    }
}
