use std::time::Instant;
use crate::common::ModelConfig;
use crate::data::TimeCalc;
use crate::detectors::PredictParams;
use crate::utils;

/// Stages of one model run. `run` chains them, logs per-stage timings and records
/// them in [`TimeCalc`] as stage 0 (preprocess), 1 (inference) and 2 (postprocess).
pub trait InferenceProcess: Sized {
    type Input;
    type Prepared;
    type Raw;
    type Output;

    /// Creates a new instance of the model with the given options.
    fn new(config: &ModelConfig) -> anyhow::Result<Self>;

    /// Pre-process the input data.
    fn preprocess(&self, x: &Self::Input) -> anyhow::Result<Self::Prepared>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, x: &Self::Prepared) -> anyhow::Result<Self::Raw>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: Self::Raw, x: &Self::Prepared, params: &PredictParams) -> anyhow::Result<Self::Output>;

    /// Accumulated stage timings of this model.
    fn timings_mut(&mut self) -> &mut TimeCalc;

    /// Executes the full pipeline.
    fn run(&mut self, x: &Self::Input, params: &PredictParams) -> anyhow::Result<Self::Output> {
        let detect_time = Instant::now();
        let start = detect_time.elapsed();

        let prepared = self.preprocess(x)?;
        let preprocessed = utils::trace("TIME", "Preprocessing input", detect_time, start);

        let ys = self.inference(&prepared)?;
        let inferred = utils::trace("TIME", "Detection run", detect_time, preprocessed);

        let ys = self.postprocess(ys, &prepared, params)?;
        let finished = utils::trace("TIME", "Postprocessing", detect_time, inferred);

        let timings = self.timings_mut();
        timings.add_or_push(0, preprocessed - start);
        timings.add_or_push(1, inferred - preprocessed);
        timings.add_or_push(2, finished - inferred);
        timings.finish_run();

        Ok(ys)
    }
}
