//! Synthetic trace generation
//!
//! Writes request traces with a hot set and a long tail: a configurable share
//! of the traffic goes to a small share of the objects, Zipf-skewed inside the
//! hot set. The hot set drifts through the key space over the run so that
//! recency-based and insertion-order policies behave differently.

use crate::models::Request;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::PathBuf;

/// Parameters for generating a synthetic trace
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Total number of requests
    pub requests: u64,
    /// Number of unique objects
    pub unique_objects: u32,
    /// Traffic distribution: percentage of traffic from popular objects
    pub popular_traffic_percent: u8,
    /// Percentage of objects considered "popular"
    pub popular_objects_percent: u8,
    /// Number of times the popular set moves during the run
    pub phases: u32,
    /// Minimum object size in bytes
    pub min_size: u64,
    /// Maximum object size in bytes
    pub max_size: u64,
    /// Minimum miss cost
    pub min_cost: f64,
    /// Maximum miss cost
    pub max_cost: f64,
    /// Output directory
    pub output_dir: PathBuf,
    /// Seed for reproducible traces
    pub seed: Option<u64>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            requests: 100_000,
            unique_objects: 10_000,
            popular_traffic_percent: 80,
            popular_objects_percent: 20,
            phases: 4,
            min_size: 1024,        // 1KB
            max_size: 1024 * 1024, // 1MB
            min_cost: 0.5,
            max_cost: 10.0,
            output_dir: PathBuf::from("traces"),
            seed: None,
        }
    }
}

/// Generator for synthetic request traces
pub struct TraceGenerator {
    config: TraceConfig,
}

impl TraceGenerator {
    /// Create a new generator with the given configuration
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Generate a trace according to the configuration, returning the file written.
    pub fn generate(&self) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config = &self.config;
        if config.unique_objects == 0 {
            return Err("unique_objects must be greater than zero".into());
        }
        if config.min_size > config.max_size || config.min_cost > config.max_cost {
            return Err("minimum must not exceed maximum".into());
        }

        fs::create_dir_all(&config.output_dir)?;
        let path = config.output_dir.join("trace.csv");
        let mut writer = csv::Writer::from_path(&path)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let popular_objects = ((config.unique_objects as f64
            * config.popular_objects_percent as f64
            / 100.0) as u32)
            .clamp(1, config.unique_objects);
        let popular_probability = config.popular_traffic_percent as f64 / 100.0;
        let phase_length = (config.requests / config.phases.max(1) as u64).max(1);

        println!("Generating trace with the following parameters:");
        println!("  Requests: {}", config.requests);
        println!("  Unique objects: {}", config.unique_objects);
        println!(
            "  Traffic distribution: {}% from {}% of objects",
            config.popular_traffic_percent, config.popular_objects_percent
        );
        println!("  Size range: {} - {} bytes", config.min_size, config.max_size);
        println!("  Cost range: {} - {}", config.min_cost, config.max_cost);

        // Zipf distribution for popular objects
        let zipf_s = 0.9;

        for i in 0..config.requests {
            let phase = (i / phase_length) as u32;
            let popular_base = phase.wrapping_mul(popular_objects / 2 + 1) % config.unique_objects;

            let object = if rng.gen::<f64>() < popular_probability {
                let rank = rng.gen_range(0..popular_objects);
                let zipf_factor = 1.0 / ((rank + 1) as f64).powf(zipf_s);
                let rank = if rng.gen::<f64>() < zipf_factor {
                    rank / 10
                } else {
                    rank
                };
                (popular_base + rank) % config.unique_objects
            } else {
                rng.gen_range(0..config.unique_objects)
            };

            let request = Request::new(
                1_700_000_000 + i,
                format!("obj_{object}"),
                object_size(object, config.min_size, config.max_size),
                object_cost(object, config.min_cost, config.max_cost),
            );
            writer.serialize(&request)?;
        }

        writer.flush()?;
        println!("Trace written to {}", path.display());
        Ok(path)
    }
}

/// Sizes and costs are a function of the object so repeated requests agree.
fn object_size(object: u32, min: u64, max: u64) -> u64 {
    let span = max - min + 1;
    min + (object as u64).wrapping_mul(2_654_435_761) % span
}

fn object_cost(object: u32, min: f64, max: f64) -> f64 {
    let fraction = ((object as u64).wrapping_mul(40_503) % 1000) as f64 / 999.0;
    min + (max - min) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TraceReader;
    use std::collections::HashMap;
    use std::path::Path;

    fn create_temp_dir(test_name: &str) -> PathBuf {
        let temp_dir = std::env::temp_dir().join(format!("policy_generator_test_{test_name}"));
        let _ = fs::remove_dir_all(&temp_dir); // Clean up any previous runs
        fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");
        temp_dir
    }

    fn cleanup_temp_dir(path: &Path) {
        let _ = fs::remove_dir_all(path);
    }

    fn small_config(dir: &Path) -> TraceConfig {
        TraceConfig {
            requests: 2_000,
            unique_objects: 100,
            output_dir: dir.to_path_buf(),
            seed: Some(7),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = TraceConfig::default();

        assert_eq!(config.requests, 100_000);
        assert_eq!(config.unique_objects, 10_000);
        assert_eq!(config.popular_traffic_percent, 80);
        assert_eq!(config.popular_objects_percent, 20);
        assert_eq!(config.min_size, 1024);
        assert_eq!(config.max_size, 1024 * 1024);
        assert_eq!(config.output_dir, PathBuf::from("traces"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_generated_trace_reads_back() {
        let temp_dir = create_temp_dir("reads_back");
        let config = small_config(&temp_dir);

        let path = TraceGenerator::new(config.clone())
            .generate()
            .expect("Generation failed");
        assert!(path.exists(), "Trace file should be created");

        let requests: Vec<Request> = TraceReader::new(&temp_dir)
            .stream_requests()
            .expect("Failed to open trace")
            .collect::<Result<_, _>>()
            .expect("Failed to parse trace");
        assert_eq!(requests.len(), 2_000);

        let mut sizes: HashMap<&str, u64> = HashMap::new();
        for request in &requests {
            assert!(request.size >= config.min_size && request.size <= config.max_size);
            assert!(request.cost >= config.min_cost && request.cost <= config.max_cost);
            // The same object always has the same size
            let size = sizes.entry(request.key.as_str()).or_insert(request.size);
            assert_eq!(*size, request.size);
        }

        cleanup_temp_dir(&temp_dir);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let first_dir = create_temp_dir("seed_a");
        let second_dir = create_temp_dir("seed_b");

        let first = TraceGenerator::new(small_config(&first_dir)).generate().unwrap();
        let second = TraceGenerator::new(small_config(&second_dir)).generate().unwrap();
        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());

        cleanup_temp_dir(&first_dir);
        cleanup_temp_dir(&second_dir);
    }

    #[test]
    fn test_popular_objects_dominate_traffic() {
        let temp_dir = create_temp_dir("popular");
        let config = TraceConfig {
            phases: 1,
            ..small_config(&temp_dir)
        };
        TraceGenerator::new(config).generate().unwrap();

        let mut counts: HashMap<String, usize> = HashMap::new();
        for request in TraceReader::new(&temp_dir).stream_requests().unwrap() {
            *counts.entry(request.unwrap().key).or_default() += 1;
        }

        // 80% of traffic targets 20 of the 100 objects
        let mut frequencies: Vec<usize> = counts.into_values().collect();
        frequencies.sort_unstable_by(|a, b| b.cmp(a));
        let top: usize = frequencies.iter().take(20).sum();
        assert!(top > 1_400, "top 20 objects received only {top} requests");

        cleanup_temp_dir(&temp_dir);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = create_temp_dir("invalid");
        let config = TraceConfig {
            min_size: 10,
            max_size: 1,
            ..small_config(&temp_dir)
        };
        assert!(TraceGenerator::new(config).generate().is_err());
        cleanup_temp_dir(&temp_dir);
    }
}
