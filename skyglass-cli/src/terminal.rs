use std::io::{self, Write};

use skyglass_core::{
    Presenter, ViewState,
    view::{CurrentView, ForecastView},
};

/// Renders view state as plain text.
#[derive(Debug)]
pub struct TerminalPresenter<W: Write> {
    out: W,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_state(&mut self, state: &ViewState) -> io::Result<()> {
        match state {
            ViewState::Welcome => {
                writeln!(self.out, "Welcome to skyglass")?;
                writeln!(
                    self.out,
                    "Search for a city or use your location to see the current weather."
                )?;
            }
            ViewState::Loading => writeln!(self.out, "Loading weather data...")?,
            ViewState::Weather { current, forecast, shown_at } => {
                let view = CurrentView::new(current, *shown_at);
                writeln!(self.out)?;
                writeln!(self.out, "{}, {}", view.city, view.country)?;
                writeln!(self.out, "{}", view.date_time)?;
                writeln!(
                    self.out,
                    "{}°C  {}  ({})",
                    view.temperature, view.description, view.icon_url
                )?;
                writeln!(self.out)?;
                for (label, value) in [
                    ("Feels like", &view.feels_like),
                    ("Humidity", &view.humidity),
                    ("Wind", &view.wind_speed),
                    ("Visibility", &view.visibility),
                    ("Pressure", &view.pressure),
                    ("UV index", &view.uv_index),
                ] {
                    writeln!(self.out, "  {label:<12} {value}")?;
                }

                if !forecast.is_empty() {
                    writeln!(self.out)?;
                    writeln!(self.out, "{}-day forecast", forecast.len())?;
                    for day in forecast.iter().map(ForecastView::from) {
                        writeln!(
                            self.out,
                            "  {:<12} {:>6}  {}",
                            day.date, day.temperature, day.description
                        )?;
                    }
                }
                writeln!(self.out)?;
            }
            ViewState::Error(message) => writeln!(self.out, "Error: {message}")?,
        }

        self.out.flush()
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn render(&mut self, state: &ViewState) {
        if let Err(err) = self.write_state(state) {
            tracing::warn!("failed to write to terminal: {err}");
        }
    }
}
