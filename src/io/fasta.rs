use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;

use crate::util::alphabet::normalize_seq;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// 流式 FASTA 读取器：去掉空白与 `\r`，序列统一大写，跳过 `;` 注释行
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n == 0 {
            self.done = true;
        }
        Ok(n > 0)
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done && self.peek_header.is_none() {
            return Ok(None);
        }

        let header = match self.peek_header.take() {
            Some(h) => h,
            None => loop {
                if !self.read_line()? {
                    return Ok(None);
                }
                if let Some(rest) = self.buf.strip_prefix('>') {
                    break rest.trim().to_string();
                }
                if !self.buf.trim().is_empty() && !self.buf.starts_with(';') {
                    anyhow::bail!("sequence data before the first '>' header: {:?}", self.buf.trim());
                }
            },
        };

        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut seq: Vec<u8> = Vec::new();
        while self.read_line()? {
            if let Some(rest) = self.buf.strip_prefix('>') {
                self.peek_header = Some(rest.trim().to_string());
                break;
            }
            if self.buf.starts_with(';') {
                continue;
            }
            seq.extend(normalize_seq(self.buf.as_bytes()));
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// 读取整个 FASTA 文件
pub fn read_fasta_file<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let path = path.as_ref();
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open FASTA '{}'", path.display()))?;
    let reader = FastaReader::new(std::io::BufReader::new(fh));
    reader
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("malformed FASTA '{}'", path.display()))
}
