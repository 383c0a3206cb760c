//! Converter: event loop from an event source into the "n" and "p" plots.

use s8core::data::event::Event;
use s8core::plots::routing::{plots_for, Plots};
use s8core::selection::selector::{EventSelector, SelectionStats};
use tracing::info;

use crate::config::Config;
use crate::data::output::OutputFile;
use crate::data::tree::EventSource;
use crate::error::Result;

// progress is reported in steps of 1/PROGRESS_FRACTIONS
const PROGRESS_FRACTIONS: usize = 10;

pub struct Converter {
    config: Config,
    selector: EventSelector,
    // all muon-jet pairs
    n: Box<dyn Plots>,
    // pairs with a tagged away jet
    p: Box<dyn Plots>,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        let mut n = plots_for(config.run_mode, "n");
        let mut p = plots_for(config.run_mode, "p");
        n.set_operating_point(&config.operating_point);
        p.set_operating_point(&config.operating_point);

        let selector = EventSelector::new(config.cuts.clone());
        Converter { config, selector, n, p }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn n(&self) -> &dyn Plots {
        self.n.as_ref()
    }

    pub fn p(&self) -> &dyn Plots {
        self.p.as_ref()
    }

    pub fn stats(&self) -> &SelectionStats {
        self.selector.stats()
    }

    /// Processes the source and saves the plots when an output is configured.
    pub fn run(&mut self, source: &mut dyn EventSource) -> Result<SelectionStats> {
        self.process(source)?;

        if let Some(path) = self.config.output.clone() {
            info!("saving output.");
            let output = OutputFile::recreate(&path)?;
            self.save(&output)?;
            info!(path = %path.display(), "output saved");
        }

        info!("{}", self.stats());
        Ok(self.stats().clone())
    }

    /// Runs the selection over the source, honouring the event cap.
    pub fn process(&mut self, source: &mut dyn EventSource) -> Result<()> {
        let mut entries = source.entries();
        if self.config.events > 0 && (self.config.events as usize) < entries {
            entries = self.config.events as usize;
        }
        info!("{} entries to be processed.", entries);

        let mut fraction = 1;
        let mut entries_fraction = entries * fraction / PROGRESS_FRACTIONS;
        for entry in 0..entries {
            if entries_fraction < entry {
                info!("{}% processed", 100 * fraction / PROGRESS_FRACTIONS);
                fraction += 1;
                entries_fraction = entries * fraction / PROGRESS_FRACTIONS;
            }

            let event = match source.next_event() {
                Some(event) => event?,
                None => break,
            };
            self.analyze(&event)?;
        }
        info!("100% processed");
        Ok(())
    }

    pub fn analyze(&mut self, event: &Event) -> Result<()> {
        self.selector.analyze(event, self.n.as_mut(), self.p.as_mut())?;
        Ok(())
    }

    /// Saves both samples under the directory of the run mode.
    pub fn save(&self, output: &OutputFile) -> Result<()> {
        let mut dir = output.mkdir(self.config.run_mode.output_directory())?;
        self.n.save(&mut dir)?;
        self.p.save(&mut dir)?;
        Ok(())
    }
}
