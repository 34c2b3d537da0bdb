use crate::align::GAP;

/// 序列类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Dna,
    Rna,
    Protein,
    Unknown,
}

impl SequenceKind {
    #[inline]
    pub fn is_nucleotide(self) -> bool {
        matches!(self, SequenceKind::Dna | SequenceKind::Rna)
    }
}

/// 根据字母组成判断序列类型。
/// 仅含 A/C/G 的序列无法区分 DNA 与 RNA，这里按 DNA 处理。
pub fn classify(seq: &[u8]) -> SequenceKind {
    if seq.is_empty() {
        return SequenceKind::Unknown;
    }
    let mut has_t = false;
    let mut has_u = false;
    let mut nucleotide = true;
    for &b in seq {
        match b.to_ascii_uppercase() {
            b'A' | b'C' | b'G' => {}
            b'T' => has_t = true,
            b'U' => has_u = true,
            c if c.is_ascii_uppercase() || c == b'*' => nucleotide = false,
            _ => return SequenceKind::Unknown,
        }
    }
    if nucleotide && !(has_t && has_u) {
        if has_u {
            SequenceKind::Rna
        } else {
            SequenceKind::Dna
        }
    } else {
        SequenceKind::Protein
    }
}

/// 去除空白并统一大写
pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq {
        if !b.is_ascii_whitespace() {
            out.push(b.to_ascii_uppercase());
        }
    }
    out
}

/// 去掉比对行中的间隙符号，还原原始序列
pub fn ungap(row: &[u8]) -> Vec<u8> {
    row.iter().copied().filter(|&b| b != GAP).collect()
}
