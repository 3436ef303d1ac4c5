//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for colorizing output and generating JSON. By
//! centralizing output logic here, every command prints kinds, fields and operators
//! the same way.

use std::io::{self, Write};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::args::ColorMode;
use crate::operators::OperatorDescriptor;
use crate::schema::{KindSpec, ResolvedField};

// ============================================================================
// OUTPUT SINK
// ============================================================================

/// Colour-aware stdout writer.
pub struct Output {
    stdout: StandardStream,
}

impl Output {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            stdout: StandardStream::stdout(color_choice(mode)),
        }
    }

    fn colored(&mut self, color: Color, bold: bool, text: &str) -> io::Result<()> {
        self.stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(self.stdout, "{text}")?;
        self.stdout.reset()
    }

    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.stdout, "{text}")
    }

    pub fn json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(self.stdout, "{text}")
    }

    // ------------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------------

    /// One row of `trellis kinds`.
    pub fn kind_row(&mut self, spec: &KindSpec) -> io::Result<()> {
        self.colored(Color::Cyan, true, &format!("{:<26}", spec.name))?;
        let family = spec.family.map_or("-", |f| f.as_str());
        writeln!(self.stdout, "{family}")
    }

    pub fn describe(&mut self, spec: &KindSpec) -> io::Result<()> {
        self.colored(Color::Cyan, true, spec.name)?;
        match spec.family {
            Some(family) => writeln!(self.stdout, " : {family}")?,
            None => writeln!(self.stdout)?,
        }

        if spec.fields.is_empty() {
            self.line("  (no fields)")?;
        }
        for field in &spec.fields {
            self.field_row(field)?;
        }
        for check in &spec.checks {
            self.colored(Color::Yellow, false, "  check    ")?;
            writeln!(self.stdout, "{}", check.name)?;
        }
        for accessor in &spec.accessors {
            self.colored(Color::Green, false, "  derived  ")?;
            writeln!(self.stdout, "{}", accessor.name)?;
        }
        Ok(())
    }

    fn field_row(&mut self, field: &ResolvedField) -> io::Result<()> {
        let c = &field.classification;
        let field_type = match field.field.field_type {
            crate::schema::FieldType::Child(kind) => kind.to_string(),
            crate::schema::FieldType::Data(data) => data.to_string(),
        };
        write!(self.stdout, "  {:<28}", field.name())?;
        write!(self.stdout, "{:<14}{:<22}", format!("{:?}", c.category), field_type)?;

        let mut notes = Vec::new();
        if field.field.required {
            notes.push("required".to_string());
        }
        if c.nullable {
            notes.push("nullable".to_string());
        }
        if let Some(initial) = &field.field.initial {
            notes.push(format!("initial={initial:?}"));
        }
        if let Some((min, max)) = field.field.bounds {
            notes.push(format!("bounds={min}..={max}"));
        }
        if let Some(codec) = field.field.raw_form {
            notes.push(format!("raw-form={}", codec.name));
        }
        self.colored(Color::Magenta, false, &notes.join(" "))?;
        writeln!(self.stdout)
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    pub fn operator_row(&mut self, name: &str, descriptor: OperatorDescriptor) -> io::Result<()> {
        self.colored(Color::Yellow, true, &format!("{:<6}", descriptor.symbol))?;
        writeln!(self.stdout, "{:<8}{}", descriptor.category.as_str(), name)
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn color_choice(mode: ColorMode) -> ColorChoice {
    match mode {
        ColorMode::Always => ColorChoice::Always,
        ColorMode::Never => ColorChoice::Never,
        ColorMode::Auto if atty::is(atty::Stream::Stdout) => ColorChoice::Auto,
        ColorMode::Auto => ColorChoice::Never,
    }
}
