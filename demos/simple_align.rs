//! 演示如何在 library 模式下使用 seq-align 进行序列比对。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_align
//! ```

use seq_align::align::{self, AlignMode, DotPlot, DpMatrix, ScoringScheme};

fn main() -> seq_align::Result<()> {
    // 1. 全局比对（Needleman-Wunsch）
    let dna = ScoringScheme::dna(2, -3, -4);
    let (s1, s2) = (b"ACG", b"AG");
    let matrix = DpMatrix::build(s1, s2, &dna, AlignMode::Global)?;
    println!("得分矩阵:\n{}", matrix.render_scores(s1, s2));
    println!("方向矩阵:\n{}", matrix.render_directions(s1, s2));

    let aln = align::reconstruct(&matrix, s1, s2)?;
    println!("全局比对 (score={}, cigar={}):", aln.score, aln.cigar());
    println!("  {}", String::from_utf8_lossy(&aln.aligned1));
    println!("  {}", String::from_utf8_lossy(&aln.aligned2));

    // 2. 局部比对（Smith-Waterman）
    let aln = align::align_local(b"ACGT", b"CG", &dna)?;
    println!("\n局部比对 (score={}):", aln.score);
    println!("  seq1[{}..{}] {}", aln.seq1_start, aln.seq1_end, String::from_utf8_lossy(&aln.aligned1));
    println!("  seq2[{}..{}] {}", aln.seq2_start, aln.seq2_end, String::from_utf8_lossy(&aln.aligned2));

    // 3. 蛋白质比对（BLOSUM62）
    let blosum = ScoringScheme::blosum62(-4);
    let aln = align::align_global(b"HEAGAWGHEE", b"PAWHEAE", &blosum)?;
    println!("\n蛋白质全局比对 (score={}):", aln.score);
    println!("  {}", String::from_utf8_lossy(&aln.aligned1));
    println!("  {}", String::from_utf8_lossy(&aln.aligned2));

    // 4. 渐进式多序列比对
    let seqs: [&[u8]; 4] = [b"ACGTTGCA", b"ACGTGCA", b"AGTTGCA", b"ACGTTGCAA"];
    let msa = align::align_progressive(&seqs, &ScoringScheme::dna(2, -1, -2))?;
    println!("\n多序列比对 ({} 行 × {} 列):", msa.n_rows(), msa.n_columns());
    for row in msa.rows() {
        println!("  {}", String::from_utf8_lossy(row));
    }
    println!("  {}  (consensus)", String::from_utf8_lossy(&msa.consensus()?));

    // 5. 滑动窗口点阵图
    let (d1, d2) = (b"GATTACAGATTACA", b"GATTACA");
    let plot = DotPlot::build(d1, d2, 3, 2)?;
    println!("\n点阵图 (window=3, stringency=2, {} 个点):", plot.count());
    print!("{}", plot.render(d1, d2));

    println!("\n完成！");
    Ok(())
}
