use crate::demo::{
    run_compress, run_demo, run_evaluate, run_pipeline, run_restore, run_shortlist, run_summary,
    DemoArgs, RestoreArgs, ReviewArgs, ScopeArgs, SummaryArgs,
};
use crate::server;
use applicant_ai::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Applicant Decisioning Engine",
    about = "Consolidate, shortlist, and assess contractor applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compress child records into canonical dossiers
    Compress(ScopeArgs),
    /// Expand dossiers back into child records
    Restore(RestoreArgs),
    /// Review dossiers against the shortlist rules
    Shortlist(ReviewArgs),
    /// Request a model assessment for consolidated dossiers
    Evaluate(ScopeArgs),
    /// Run consolidation, shortlist review, and assessment end to end
    Pipeline(ReviewArgs),
    /// Process the sample store and print shortlist and assessment summaries
    Summary(SummaryArgs),
    /// Walk one applicant through every stage, then batch the rest
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Compress(args) => run_compress(args),
        Command::Restore(args) => run_restore(args),
        Command::Shortlist(args) => run_shortlist(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Pipeline(args) => run_pipeline(args),
        Command::Summary(args) => run_summary(args),
        Command::Demo(args) => run_demo(args),
    }
}
