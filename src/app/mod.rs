// Application layer: rendering of evaluation results for the binaries.

pub mod report;
