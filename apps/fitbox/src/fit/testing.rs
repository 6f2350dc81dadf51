//! Test doubles for the capability traits.

use crate::fit::measurer::{BoxSize, ContainerSnapshot, Measurer};

/// Measurer whose rendered box is a pure function of the probe font size.
pub(crate) struct ScriptedMeasurer<F> {
    measure: F,
    tried: Vec<f64>,
    live: usize,
}

pub(crate) struct ScriptedProbe {
    font_size: f64,
}

impl<F: Fn(f64) -> BoxSize> ScriptedMeasurer<F> {
    pub(crate) fn new(measure: F) -> Self {
        ScriptedMeasurer {
            measure,
            tried: Vec::new(),
            live: 0,
        }
    }

    /// Every font size the probe was rendered at, starting with the clone.
    pub(crate) fn tried_sizes(&self) -> &[f64] {
        &self.tried
    }

    pub(crate) fn live_probes(&self) -> usize {
        self.live
    }
}

impl<F: Fn(f64) -> BoxSize> Measurer for ScriptedMeasurer<F> {
    type Probe = ScriptedProbe;

    fn create_probe(&mut self, snapshot: &ContainerSnapshot) -> ScriptedProbe {
        self.live += 1;
        self.tried.push(snapshot.font_size);
        ScriptedProbe {
            font_size: snapshot.font_size,
        }
    }

    fn set_probe_font_size(&mut self, probe: &mut ScriptedProbe, font_size: f64) {
        self.tried.push(font_size);
        probe.font_size = font_size;
    }

    fn measure(&self, probe: &ScriptedProbe) -> BoxSize {
        (self.measure)(probe.font_size)
    }

    fn remove_probe(&mut self, _probe: ScriptedProbe) {
        self.live -= 1;
    }
}
