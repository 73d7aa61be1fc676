use anyhow::{anyhow, bail, Context};
use serde::Serialize;

use apartment_console::commands::{self, AppContext};
use apartment_console::models::ApartmentForm;
use apartment_console::utils::{config, ui_state};

const USAGE: &str = "usage: apartment-console <dashboard|models|clustering|history|predict|settings> [--key value ...]

  predict   --model <random_forest|knn|naive_bayes> [--price 1000] [--size 80] [--rooms 2]
            [--bathroom 1] [--parking 1] [--furnished 1] [--elevator 1] [--balcony 1]
            [--floor 2] [--age 5] [--location_score 7]
  settings  [--backend.data_url http://localhost:8080] [--general.theme dark] ...";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(command) = args.next() else {
        bail!(USAGE);
    };
    let options = parse_options(args.collect())?;

    let config_path = config::config_path();
    let settings = config::load_settings(&config_path).map_err(|e| anyhow!(e))?;
    ui_state::init_from_settings(&settings.general);
    log::debug!(
        "prediction service {}, data service {}",
        settings.backend.prediction_url,
        settings.backend.data_url
    );

    let mut ctx = AppContext::new(config_path, settings)
        .map_err(|e| anyhow!(e))
        .context("failed to build HTTP client")?;

    match command.as_str() {
        "dashboard" => print(commands::dashboard::get_dashboard_summary(&ctx).await),
        "models" => print(commands::models::get_model_comparison(&ctx).await),
        "clustering" => print(commands::clustering::get_clustering(&ctx).await),
        "history" => print(commands::history::get_prediction_history(&ctx).await),
        "predict" => {
            let mut model = None;
            let mut form = ApartmentForm::new();
            for (key, value) in options {
                if key == "model" {
                    model = Some(value);
                } else {
                    form.set(key, value);
                }
            }
            let model = model.unwrap_or_else(|| "random_forest".to_string());
            print(commands::predict::predict_price_category(&ctx, &model, &form).await)
        }
        "settings" if options.is_empty() => print(commands::settings::get_settings(&ctx)),
        "settings" => print(commands::settings::update_settings(&mut ctx, &options)),
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command `{}`\n\n{}", other, USAGE),
    }
}

fn parse_options(args: Vec<String>) -> anyhow::Result<Vec<(String, String)>> {
    let mut options = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let Some(key) = arg.strip_prefix("--") else {
            bail!("unexpected argument `{}`", arg);
        };
        match key.split_once('=') {
            Some((k, v)) => options.push((k.to_string(), v.to_string())),
            None => {
                let value = iter.next().with_context(|| format!("missing value for --{}", key))?;
                options.push((key.to_string(), value));
            }
        }
    }
    Ok(options)
}

fn print<T: Serialize>(result: Result<T, String>) -> anyhow::Result<()> {
    let value = result.map_err(|e| anyhow!(e))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
