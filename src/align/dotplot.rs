//! 滑动窗口点阵图（dot plot）。
//!
//! 对 seq1 的每个起点 p1 与 seq2 的每个起点 p2，比较两条长度为 `window`
//! 的子串，逐位相同的个数不少于 `stringency` 时在 (p1, p2) 记一个点。
//! 与动态规划无关，只用于肉眼观察重复与共线区段。

use std::fmt::Write as _;

use crate::error::{AlignError, Result};

/// 点阵图，(n-w+1)×(m-w+1)，行优先展平存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPlot {
    rows: usize,
    cols: usize,
    window: usize,
    stringency: usize,
    dots: Vec<bool>,
}

/// 两个窗口中逐位相同的符号数
#[inline]
pub fn window_matches(seq1: &[u8], seq2: &[u8], pos1: usize, pos2: usize, window: usize) -> usize {
    seq1[pos1..pos1 + window]
        .iter()
        .zip(&seq2[pos2..pos2 + window])
        .filter(|(a, b)| a == b)
        .count()
}

#[inline]
fn window_starts(len: usize, window: usize) -> usize {
    if len >= window {
        len - window + 1
    } else {
        0
    }
}

impl DotPlot {
    /// `window` 至少为 1，`stringency` 不能超过 `window`。
    /// 序列短于窗口时点阵图为空。
    pub fn build(seq1: &[u8], seq2: &[u8], window: usize, stringency: usize) -> Result<Self> {
        if window == 0 || stringency > window {
            return Err(AlignError::InvalidWindow { window, stringency });
        }
        let rows = window_starts(seq1.len(), window);
        let cols = window_starts(seq2.len(), window);

        let mut dots = vec![false; rows * cols];
        for p1 in 0..rows {
            for p2 in 0..cols {
                dots[p1 * cols + p2] = window_matches(seq1, seq2, p1, p2, window) >= stringency;
            }
        }

        let plot = Self { rows, cols, window, stringency, dots };
        log::debug!(
            "dot plot: {}x{} windows, window={} stringency={}, {} dots",
            rows,
            cols,
            window,
            stringency,
            plot.count()
        );
        Ok(plot)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn stringency(&self) -> usize {
        self.stringency
    }

    #[inline]
    pub fn is_dot(&self, p1: usize, p2: usize) -> bool {
        self.dots[p1 * self.cols + p2]
    }

    pub fn count(&self) -> usize {
        self.dots.iter().filter(|&&d| d).count()
    }

    /// 所有点的窗口起点 (p1, p2)，行优先顺序
    pub fn dots(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.dots
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(move |(idx, _)| (idx / cols, idx % cols))
    }

    /// 文本点阵：顶部为 seq2 的各窗口，左侧为 seq1 的各窗口
    pub fn render(&self, seq1: &[u8], seq2: &[u8]) -> String {
        let w = self.window;
        let mut out = String::new();
        let _ = write!(out, "{:w$}", "", w = w + 1);
        for p2 in 0..self.cols {
            let _ = write!(out, " {}", String::from_utf8_lossy(&seq2[p2..p2 + w]));
        }
        out.push('\n');
        for p1 in 0..self.rows {
            let _ = write!(out, "{} ", String::from_utf8_lossy(&seq1[p1..p1 + w]));
            for p2 in 0..self.cols {
                let mark = if self.is_dot(p1, p2) { "•" } else { " " };
                let _ = write!(out, " {:<w$}", mark, w = w);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_match_counts() {
        assert_eq!(window_matches(b"ACGT", b"ACGA", 0, 0, 3), 3);
        assert_eq!(window_matches(b"ACGT", b"ACGA", 1, 1, 3), 2);
        assert_eq!(window_matches(b"ACGT", b"ACGA", 0, 1, 3), 0);
    }

    #[test]
    fn windowed_plot_with_stringency() {
        let p = DotPlot::build(b"ACGT", b"ACGA", 3, 2).unwrap();
        assert_eq!((p.rows(), p.cols()), (2, 2));
        assert!(p.is_dot(0, 0));
        assert!(!p.is_dot(0, 1));
        assert!(!p.is_dot(1, 0));
        // CGT / CGA 有 2 个相同
        assert!(p.is_dot(1, 1));
        assert_eq!(p.dots().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);

        let strict = DotPlot::build(b"ACGT", b"ACGA", 3, 3).unwrap();
        assert_eq!(strict.dots().collect::<Vec<_>>(), vec![(0, 0)]);
    }

    #[test]
    fn window_one_is_plain_identity_plot() {
        let p = DotPlot::build(b"AAC", b"CA", 1, 1).unwrap();
        assert_eq!((p.rows(), p.cols()), (3, 2));
        assert_eq!(p.dots().collect::<Vec<_>>(), vec![(0, 1), (1, 1), (2, 0)]);
        assert_eq!(p.count(), 3);
    }

    #[test]
    fn self_plot_has_full_diagonal() {
        let s = b"GATTACAGATTACA";
        let p = DotPlot::build(s, s, 4, 4).unwrap();
        for k in 0..p.rows() {
            assert!(p.is_dot(k, k));
        }
        // 重复的 GATTACA 产生偏移 7 的平行对角线
        assert!(p.is_dot(0, 7));
        assert!(p.is_dot(7, 0));
    }

    #[test]
    fn short_sequence_gives_empty_plot() {
        let p = DotPlot::build(b"AC", b"ACGT", 3, 1).unwrap();
        assert_eq!(p.rows(), 0);
        assert_eq!(p.count(), 0);
        assert_eq!(p.render(b"AC", b"ACGT").lines().count(), 1);
    }

    #[test]
    fn invalid_window_is_rejected() {
        assert!(matches!(
            DotPlot::build(b"ACGT", b"ACGT", 0, 0),
            Err(AlignError::InvalidWindow { window: 0, stringency: 0 })
        ));
        assert!(matches!(
            DotPlot::build(b"ACGT", b"ACGT", 2, 3),
            Err(AlignError::InvalidWindow { window: 2, stringency: 3 })
        ));
    }

    #[test]
    fn render_labels_windows() {
        let p = DotPlot::build(b"ACGT", b"ACGA", 3, 2).unwrap();
        let text = p.render(b"ACGT", b"ACGA");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("ACG") && lines[0].contains("CGA"));
        assert!(lines[1].starts_with("ACG"));
        assert!(lines[2].starts_with("CGT"));
        assert!(lines[1].contains('•'));
    }
}
