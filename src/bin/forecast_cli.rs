use anyhow::Context;
use clap::{Parser, Subcommand};
use lstm_forecast::history::{load_closes, DEFAULT_CLOSE_COLUMN};
use lstm_forecast::services::{evaluate, DEFAULT_TRAIN_RATIO};
use lstm_forecast::{logging, MinMaxScaler, SequenceModel};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "forecast-cli")]
#[command(about = "Scaler fitting and hold-out evaluation for the LSTM price model")]
struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the min/max scaler on a price history and write it as JSON
    FitScaler {
        /// CSV file with a header row and a close column
        #[arg(long)]
        history: PathBuf,

        /// Name of the close column
        #[arg(long, default_value = DEFAULT_CLOSE_COLUMN)]
        column: String,

        /// Where to write the scaler
        #[arg(short, long, default_value = "scaler.json")]
        output: PathBuf,
    },

    /// Score a persisted model on the trailing test split of a price history
    Evaluate {
        /// CSV file with a header row and a close column
        #[arg(long)]
        history: PathBuf,

        /// Name of the close column
        #[arg(long, default_value = DEFAULT_CLOSE_COLUMN)]
        column: String,

        #[arg(long, default_value = "modelo_lstm_acao.json")]
        model: PathBuf,

        #[arg(long, default_value = "scaler.json")]
        scaler: PathBuf,

        /// Fraction of windows treated as training data
        #[arg(long, default_value_t = DEFAULT_TRAIN_RATIO)]
        train_ratio: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init_cli(args.verbose);

    match args.command {
        Command::FitScaler {
            history,
            column,
            output,
        } => {
            let closes = load_closes(&history, &column)
                .with_context(|| format!("failed to load {}", history.display()))?;
            let scaler = MinMaxScaler::fit(&closes)?;
            scaler.save(&output)?;

            info!(
                "Fitted scaler on {} closes (min {:.2}, max {:.2}) -> {}",
                closes.len(),
                scaler.data_min,
                scaler.data_max,
                output.display()
            );
        }
        Command::Evaluate {
            history,
            column,
            model,
            scaler,
            train_ratio,
            json,
        } => {
            if !(0.0..1.0).contains(&train_ratio) {
                anyhow::bail!("train ratio must be in [0, 1), got {}", train_ratio);
            }

            let closes = load_closes(&history, &column)
                .with_context(|| format!("failed to load {}", history.display()))?;
            let model = SequenceModel::load(&model)?;
            let scaler = MinMaxScaler::load(&scaler)?;

            let report = evaluate(&model, &scaler, &closes, train_ratio)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                info!("Test windows: {}", report.samples);
                info!("MAE: {:.2}", report.mae);
                info!("RMSE: {:.2}", report.rmse);
                match (report.mape, report.accuracy) {
                    (Some(mape), Some(accuracy)) => {
                        info!("MAPE: {:.2}%", mape);
                        info!("Approximate accuracy: {:.2}%", accuracy);
                    }
                    _ => info!("MAPE: undefined (all actual prices are zero)"),
                }
                info!("R²: {:.4}", report.r2);
            }
        }
    }

    Ok(())
}
