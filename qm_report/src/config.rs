use std::path::{Path, PathBuf};

use crate::sample::Sample;

pub struct Config {
    analysis_dir: PathBuf,
    sample_list: Vec<Sample>,
    output_file: Option<PathBuf>,
}

impl Config {
    pub fn new(analysis_dir: PathBuf, sample_list: Vec<Sample>) -> Self {
        Self {
            analysis_dir,
            sample_list,
            output_file: None,
        }
    }

    pub fn set_output_file(&mut self, p: PathBuf) {
        self.output_file = Some(p)
    }

    pub fn analysis_dir(&self) -> &Path {
        &self.analysis_dir
    }

    pub fn sample_list(&self) -> &[Sample] {
        &self.sample_list
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }
}
