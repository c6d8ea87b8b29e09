use std::{env, path::Path};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};

use leaky_judge::{
    Model, Trainer,
    background::BackgroundQueue,
    config::RunConfig,
    dataset::CsvSamples,
};

const QUEUE_CAPACITY: usize = 16;

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        bail!("usage: leaky_judge <config.json>");
    };

    let config =
        RunConfig::load(&path).with_context(|| format!("loading configuration from {path}"))?;

    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("building the thread pool")?;
    }

    let mut model = load_or_create(&config)?;

    if config.passes > 0 {
        model = train(&config, model)?;
    }

    if let Some(test_data_path) = &config.test_data_path {
        evaluate(&model, test_data_path, config.skip_header)?;
    }

    Ok(())
}

/// Runs the configured training passes, checkpointing after each one.
fn train(config: &RunConfig, model: Model) -> Result<Model> {
    let mut trainer = Trainer::new(model)?;
    let schedule = config.lr_schedule();
    let queue = BackgroundQueue::new(QUEUE_CAPACITY);

    let mut learning_rate = config.learning_rate;

    for pass in 0..config.passes {
        trainer.reset_counters();

        let samples = CsvSamples::open(&config.train_data_path, config.skip_header)
            .with_context(|| format!("opening {}", config.train_data_path))?;

        for sample in samples {
            let sample = sample.with_context(|| format!("reading {}", config.train_data_path))?;
            trainer
                .adjust(&sample, learning_rate)
                .with_context(|| format!("training pass {pass}"))?;

            let n = trainer.iteration_count();
            if config.progress_every > 0 && n % config.progress_every == 0 {
                let accuracy = trainer.accuracy();
                queue.submit(move || {
                    info!("pass {pass} sample {n}: {:.2}% correct", accuracy * 100.);
                    Ok(())
                });
            }
        }

        let accuracy = trainer.accuracy();
        info!(
            "pass {pass} done: {}/{} correct ({:.2}%) at learning rate {learning_rate}",
            trainer.correct_count(),
            trainer.iteration_count(),
            accuracy * 100.
        );
        learning_rate = schedule.next_rate(learning_rate, accuracy);

        let snapshot = trainer.to_model().clone();
        let model_path = config.model_path.clone();
        queue.submit(move || {
            snapshot.write_to(&model_path)?;
            info!("checkpoint written to {model_path}");
            Ok(())
        });

        for failure in queue.drain_errors() {
            warn!("{failure}");
        }
    }

    let failures = queue.shutdown();
    if let Some(failure) = failures.into_iter().next() {
        return Err(failure).context("background task");
    }

    Ok(trainer.into_model())
}

/// Scores the model on a held-out labeled CSV.
fn evaluate(model: &Model, path: &str, skip_header: bool) -> Result<()> {
    let samples =
        CsvSamples::open(path, skip_header).with_context(|| format!("opening {path}"))?;
    let evaluation = model
        .evaluate(samples)
        .with_context(|| format!("evaluating on {path}"))?;

    info!(
        "test samples: {}, correct: {}, wrong: {} ({:.2}%)",
        evaluation.count(),
        evaluation.correct,
        evaluation.wrong,
        evaluation.accuracy() * 100.
    );

    Ok(())
}

/// Resumes from the configured model file, or builds a fresh model when there is none.
fn load_or_create(config: &RunConfig) -> Result<Model> {
    if Path::new(&config.model_path).exists() {
        info!("resuming from {}", config.model_path);
        return Model::read_from(&config.model_path)
            .with_context(|| format!("loading model from {}", config.model_path));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!("creating a fresh model with {} layers", config.layers.len());
    let layers = config.build_layers(&mut rng)?;
    Ok(Model::new(layers)?)
}
