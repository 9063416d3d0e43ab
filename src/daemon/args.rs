use std::time::Duration;

use clap::Args;

use super::collection::sampler::{SamplerConfig, DEFAULT_SAMPLING_PERIOD, DEFAULT_WINDOW_THRESHOLD};

#[derive(Args, Debug, Clone)]
pub struct DaemonArgs {
    #[arg(
        long,
        default_value_t = DEFAULT_SAMPLING_PERIOD.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between two activity samples"
    )]
    pub interval: u64,
    #[arg(
        long,
        default_value_t = DEFAULT_WINDOW_THRESHOLD,
        value_parser = parse_threshold,
        help = "Number of samples that are summarized together"
    )]
    pub threshold: usize,
    #[arg(
        long = "capture-command",
        help = "Shell command printing a description of the current activity, e.g. \"xdotool getactivewindow getwindowname\""
    )]
    pub capture_command: String,
    #[arg(
        long = "summarize-command",
        help = "Shell command reading a JSON array of samples on stdin and printing a summary"
    )]
    pub summarize_command: String,
}

impl DaemonArgs {
    pub fn sampler_config(&self) -> SamplerConfig {
        SamplerConfig {
            period: Duration::from_secs(self.interval),
            threshold: self.threshold,
        }
    }
}

fn parse_threshold(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("threshold has to be at least 1".into()),
        Ok(v) => Ok(v),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::DaemonArgs;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        daemon: DaemonArgs,
    }

    #[test]
    fn test_defaults_match_reference_cadence() {
        let args = TestArgs::try_parse_from([
            "test",
            "--capture-command",
            "echo capture",
            "--summarize-command",
            "cat",
        ])
        .unwrap();
        let config = args.daemon.sampler_config();
        assert_eq!(config.period, Duration::from_secs(60));
        assert_eq!(config.threshold, 15);
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let result = TestArgs::try_parse_from([
            "test",
            "--threshold",
            "0",
            "--capture-command",
            "echo capture",
            "--summarize-command",
            "cat",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = TestArgs::try_parse_from([
            "test",
            "--interval",
            "0",
            "--capture-command",
            "echo capture",
            "--summarize-command",
            "cat",
        ]);
        assert!(result.is_err());
    }
}
