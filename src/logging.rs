use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::General;
use crate::errors::LoggingError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Sets up log4rs with a file appender and, if configured, a console appender
///
/// # Arguments
///
/// * 'general' - general configuration holding log path, level and stdout flag
pub fn setup_logger(general: &General) -> Result<(), LoggingError> {
    let config = build_log_config(general)?;
    log4rs::init_config(config)?;

    Ok(())
}

fn build_log_config(general: &General) -> Result<LogConfig, LoggingError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn builds_file_and_console_appenders() {
        let dir = tempfile::tempdir().unwrap();
        let general = General {
            log_path: dir.path().join("run.log").to_string_lossy().to_string(),
            log_level: LevelFilter::Debug,
            log_to_stdout: true,
        };

        let config = build_log_config(&general).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Debug);
    }

    #[test]
    fn file_only_when_stdout_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let general = General {
            log_path: dir.path().join("run.log").to_string_lossy().to_string(),
            log_level: LevelFilter::Warn,
            log_to_stdout: false,
        };

        let config = build_log_config(&general).unwrap();
        assert_eq!(config.appenders().len(), 1);
        assert_eq!(config.root().appenders().to_vec(), vec!["file".to_string()]);
    }
}
