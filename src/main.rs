use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use seq_align::align::{self, AlignMode, AlignOpt, Alignment, DotPlot, DpMatrix, MatrixChoice, ScoringScheme};
use seq_align::io::fasta::{read_fasta_file, FastaRecord};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "seq-align", author, version, about = "Pairwise and progressive multiple sequence alignment", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct ScoringArgs {
    #[arg(long = "match", default_value_t = 2, allow_hyphen_values = true)]
    match_score: i32,
    #[arg(long = "mismatch", default_value_t = -3, allow_hyphen_values = true)]
    mismatch_score: i32,
    /// Linear gap penalty (added per gap symbol)
    #[arg(long = "gap", default_value_t = -4, allow_hyphen_values = true)]
    gap_penalty: i32,
    #[arg(long, value_enum, default_value_t = MatrixChoice::Auto)]
    matrix: MatrixChoice,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Global (Needleman-Wunsch) alignment of the first two FASTA records
    Global {
        /// Input FASTA file
        input: PathBuf,
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Also print the score and direction matrices
        #[arg(long)]
        show_matrix: bool,
    },
    /// Local (Smith-Waterman) alignment of the first two FASTA records
    Local {
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        scoring: ScoringArgs,
        #[arg(long)]
        show_matrix: bool,
    },
    /// Progressive multiple alignment of all FASTA records, in file order
    Msa {
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Write a binary snapshot of the alignment
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Sliding-window dot plot of the first two FASTA records
    Dotplot {
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Window length
        #[arg(short, long, default_value_t = 1)]
        window: usize,
        /// Minimum identical positions per window (defaults to the window length)
        #[arg(short, long)]
        stringency: Option<usize>,
    },
    /// All-vs-all pairwise scores, computed in parallel
    Pairs {
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[command(flatten)]
        scoring: ScoringArgs,
        /// Use local instead of global alignment
        #[arg(long)]
        local: bool,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
    },
}

impl ScoringArgs {
    fn opt(self, threads: usize) -> AlignOpt {
        AlignOpt {
            match_score: self.match_score,
            mismatch_score: self.mismatch_score,
            gap_penalty: self.gap_penalty,
            matrix: self.matrix,
            threads,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Global { input, out, scoring, show_matrix } => {
            run_pairwise(&input, out.as_deref(), scoring.opt(1), AlignMode::Global, show_matrix)
        }
        Commands::Local { input, out, scoring, show_matrix } => {
            run_pairwise(&input, out.as_deref(), scoring.opt(1), AlignMode::Local, show_matrix)
        }
        Commands::Msa { input, out, scoring, save } => run_msa(&input, out.as_deref(), scoring.opt(1), save.as_deref()),
        Commands::Dotplot { input, out, window, stringency } => {
            run_dotplot(&input, out.as_deref(), window, stringency.unwrap_or(window))
        }
        Commands::Pairs { input, out, scoring, local, threads } => {
            let mode = if local { AlignMode::Local } else { AlignMode::Global };
            run_pairs(&input, out.as_deref(), scoring.opt(threads), mode)
        }
    }
}

fn open_output(out_path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match out_path {
        Some(p) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(p).with_context(|| format!("cannot create output '{}'", p.display()))?,
        )),
        None => Box::new(std::io::BufWriter::new(std::io::stdout())),
    })
}

fn write_header(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "# seq-align {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "# command: {}", std::env::args().collect::<Vec<_>>().join(" "))?;
    writeln!(out, "# date: {}", chrono::Utc::now().to_rfc3339())?;
    Ok(())
}

fn load_records(input: &Path, min: usize) -> Result<Vec<FastaRecord>> {
    let records = read_fasta_file(input)?;
    if records.len() < min {
        anyhow::bail!("FASTA file '{}' has {} record(s), need at least {}", input.display(), records.len(), min);
    }
    log::info!("loaded {} record(s) from {}", records.len(), input.display());
    Ok(records)
}

fn scoring_for(opt: &AlignOpt, records: &[FastaRecord]) -> Result<ScoringScheme> {
    let seqs: Vec<&[u8]> = records.iter().map(|r| r.seq.as_slice()).collect();
    opt.scoring(&seqs).context("cannot select a scoring scheme")
}

fn run_pairwise(input: &Path, out_path: Option<&Path>, opt: AlignOpt, mode: AlignMode, show_matrix: bool) -> Result<()> {
    let records = load_records(input, 2)?;
    let (r1, r2) = (&records[0], &records[1]);
    let scoring = scoring_for(&opt, &records[..2])?;

    let matrix = DpMatrix::build(&r1.seq, &r2.seq, &scoring, mode)
        .with_context(|| format!("cannot align '{}' with '{}'", r1.id, r2.id))?;
    let aln = align::reconstruct(&matrix, &r1.seq, &r2.seq)?;

    let mut out = open_output(out_path)?;
    write_header(&mut out)?;
    if show_matrix {
        writeln!(out, "# scores")?;
        write!(out, "{}", matrix.render_scores(&r1.seq, &r2.seq))?;
        writeln!(out, "# directions")?;
        write!(out, "{}", matrix.render_directions(&r1.seq, &r2.seq))?;
    }
    write_alignment(&mut out, &aln, &r1.id, &r2.id)?;
    out.flush()?;
    Ok(())
}

fn write_alignment(out: &mut dyn Write, aln: &Alignment, id1: &str, id2: &str) -> Result<()> {
    let width = id1.len().max(id2.len());
    writeln!(out, "# score: {}", aln.score)?;
    writeln!(out, "# cigar: {}", aln.cigar())?;
    writeln!(out, "# identity: {:.2}%", aln.identity() * 100.0)?;
    writeln!(
        out,
        "{:<w$}  {:>6}-{:<6}  {}",
        id1,
        aln.seq1_start + 1,
        aln.seq1_end,
        String::from_utf8_lossy(&aln.aligned1),
        w = width
    )?;
    writeln!(
        out,
        "{:<w$}  {:>6}-{:<6}  {}",
        id2,
        aln.seq2_start + 1,
        aln.seq2_end,
        String::from_utf8_lossy(&aln.aligned2),
        w = width
    )?;
    Ok(())
}

fn run_msa(input: &Path, out_path: Option<&Path>, opt: AlignOpt, save: Option<&Path>) -> Result<()> {
    let records = load_records(input, 1)?;
    let scoring = scoring_for(&opt, &records)?;
    let seqs: Vec<&[u8]> = records.iter().map(|r| r.seq.as_slice()).collect();
    let msa = align::align_progressive(&seqs, &scoring).context("progressive alignment failed")?;

    let mut out = open_output(out_path)?;
    write_header(&mut out)?;
    writeln!(out, "# rows: {}  columns: {}", msa.n_rows(), msa.n_columns())?;
    writeln!(out, "# conservation: {:.2}%", msa.conservation() * 100.0)?;
    let width = records.iter().map(|r| r.id.len()).max().unwrap_or(0).max("consensus".len());
    for (rec, row) in records.iter().zip(msa.rows()) {
        writeln!(out, "{:<w$}  {}", rec.id, String::from_utf8_lossy(row), w = width)?;
    }
    let consensus = msa.consensus()?;
    writeln!(out, "{:<w$}  {}", "consensus", String::from_utf8_lossy(&consensus), w = width)?;
    out.flush()?;

    if let Some(path) = save {
        msa.save_to_file(path)
            .with_context(|| format!("cannot write snapshot to '{}'", path.display()))?;
        log::info!("snapshot saved: {}", path.display());
    }
    Ok(())
}

fn run_dotplot(input: &Path, out_path: Option<&Path>, window: usize, stringency: usize) -> Result<()> {
    let records = load_records(input, 2)?;
    let (r1, r2) = (&records[0], &records[1]);
    let plot = DotPlot::build(&r1.seq, &r2.seq, window, stringency).context("cannot build dot plot")?;

    let mut out = open_output(out_path)?;
    write_header(&mut out)?;
    writeln!(out, "# {} vs {}", r1.id, r2.id)?;
    writeln!(out, "# window: {}  stringency: {}  dots: {}", plot.window(), plot.stringency(), plot.count())?;
    write!(out, "{}", plot.render(&r1.seq, &r2.seq))?;
    out.flush()?;
    Ok(())
}

fn run_pairs(input: &Path, out_path: Option<&Path>, opt: AlignOpt, mode: AlignMode) -> Result<()> {
    let records = load_records(input, 2)?;
    let scoring = scoring_for(&opt, &records)?;
    let seqs: Vec<&[u8]> = records.iter().map(|r| r.seq.as_slice()).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads.max(1))
        .build()
        .context("cannot build thread pool")?;
    let results = pool.install(|| align::align_all_vs_all(&seqs, &scoring, mode));

    let mut out = open_output(out_path)?;
    write_header(&mut out)?;
    writeln!(out, "#seq1\tseq2\tscore\tidentity\tcigar")?;
    for pair in results {
        let (a, b) = (&records[pair.i].id, &records[pair.j].id);
        let aln = pair.result.with_context(|| format!("cannot align '{}' with '{}'", a, b))?;
        writeln!(out, "{}\t{}\t{}\t{:.4}\t{}", a, b, aln.score, aln.identity(), aln.cigar())?;
    }
    out.flush()?;
    Ok(())
}
