//! Trains the equality (AND/NOR) classifier and reports progress.
//!
//! Usage:
//!   gatenet [CONFIG.json] [HISTORY_OUT.json]
//!
//! Without a config file the reference run is used. When a second path is
//! given the (epoch, cost) history is written there for plotting.

use std::env;
use std::error::Error;

use gatenet::data::{equality_dataset, held_out};
use gatenet::train::should_report;
use gatenet::{Network, RunConfig, Trainer};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            log::info!("loading config from {path}");
            RunConfig::load_json(&path)?
        }
        None => RunConfig::default(),
    };
    let history_path = args.next();

    let train_data = equality_dataset(config.n_examples, config.data_seed)?;
    let test_data = held_out();

    let network = Network::new(config.model.clone(), train_data.n_features())?;
    let mut trainer = Trainer::new(network, config.train)?;

    trainer.fit(&train_data, |trainer, stats| {
        if should_report(stats.epoch, stats.total_epochs) {
            match trainer.accuracy(&train_data) {
                Ok(accuracy) => println!(
                    "EPOCH: {} \t Cost: {:.3} \t Accuracy: %{}",
                    stats.epoch, stats.cost, accuracy.round()
                ),
                Err(e) => log::warn!("epoch {}: could not compute accuracy: {}", stats.epoch, e),
            }
        }
    })?;

    if let Some(path) = history_path {
        trainer.history().save_json(&path)?;
        log::info!("wrote {} epoch records to {path}", trainer.history().len());
    }

    let test_prediction = trainer.network().predict(test_data.features());
    let test_accuracy = trainer.accuracy(&test_data)?;
    let predicted: Vec<f64> = test_prediction.data.iter().map(|row| row[0]).collect();
    println!("{:?}", predicted);
    println!("Test Accuracy: %{}", test_accuracy.round());

    Ok(())
}
