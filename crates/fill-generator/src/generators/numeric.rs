//! Numeric value generators: `integer`, `real` and `bit`.

use crate::generator::ValueGenerator;
use crate::registry::{required, BuildContext, GeneratorEntry, ValidationContext};
use async_trait::async_trait;
use fill_core::{Column, CustomizedTable, FillError, GeneratedValue, GeneratorKind, Monotonic, Row};
use rand::rngs::StdRng;
use rand::Rng;

/// Widest bit column a generated value fits in.
const MAX_BITS: f64 = 63.0;

/// A monotonic walk through `[min, max]` spread over `delta_rows` rows.
///
/// Each step adds a random increment in `[0, (max - min) / delta_rows]`, so
/// the walk never leaves the range. `DESC` walks down from `max`.
#[derive(Debug, Clone)]
pub struct MonotonicCursor {
    direction: Monotonic,
    min: f64,
    max: f64,
    step: f64,
    current: f64,
}

impl MonotonicCursor {
    /// Cursor for the given direction, `None` when the column is not monotonic.
    pub fn new(direction: Monotonic, min: f64, max: f64, delta_rows: u64) -> Option<Self> {
        let current = match direction {
            Monotonic::Asc => min,
            Monotonic::Desc => max,
            Monotonic::None => return None,
        };
        Some(Self {
            direction,
            min,
            max,
            step: (max - min) / delta_rows.max(1) as f64,
            current,
        })
    }

    pub fn next_value(&mut self, rng: &mut StdRng) -> f64 {
        let increment = if self.step > 0.0 {
            rng.random_range(0.0..=self.step)
        } else {
            0.0
        };
        self.current = match self.direction {
            Monotonic::Desc => (self.current - increment).max(self.min),
            _ => (self.current + increment).min(self.max),
        };
        self.current
    }
}

fn validate_range(column: &Column, kind: GeneratorKind) -> Result<(f64, f64), String> {
    let min = required(column.min, "min", kind)?;
    let max = required(column.max, "max", kind)?;
    if min > max {
        return Err(format!("min ({min}) must not exceed max ({max})"));
    }
    Ok((min, max))
}

// ============================================================================
// integer
// ============================================================================

pub fn integer_entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Integer,
        engines: &[],
        validate: validate_integer,
        build: build_integer,
    }
}

fn integer_bounds(column: &Column) -> Result<(i64, i64), String> {
    let (min, max) = validate_range(column, GeneratorKind::Integer)?;
    let (min, max) = (min.ceil() as i64, max.floor() as i64);
    if min > max {
        return Err(format!("no integer between min ({min}) and max ({max})"));
    }
    Ok((min, max))
}

fn validate_integer(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    integer_bounds(column).map(|_| ())
}

fn build_integer(
    table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (min, max) = integer_bounds(column)?;
    Ok(Box::new(IntegerGenerator {
        min,
        max,
        cursor: MonotonicCursor::new(column.monotonic, min as f64, max as f64, table.delta_rows),
        rng: ctx.rng,
    }))
}

/// Uniform integers in `[min, max]`, or a monotonic sequence.
pub struct IntegerGenerator {
    min: i64,
    max: i64,
    cursor: Option<MonotonicCursor>,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for IntegerGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let value = match &mut self.cursor {
            Some(cursor) => (cursor.next_value(&mut self.rng).round() as i64).clamp(self.min, self.max),
            None => self.rng.random_range(self.min..=self.max),
        };
        Ok(GeneratedValue::Int64(value))
    }
}

// ============================================================================
// real
// ============================================================================

pub fn real_entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Real,
        engines: &[],
        validate: validate_real,
        build: build_real,
    }
}

fn validate_real(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    validate_range(column, GeneratorKind::Real).map(|_| ())
}

fn build_real(
    table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let (min, max) = validate_range(column, GeneratorKind::Real)?;
    Ok(Box::new(RealGenerator {
        min,
        max,
        cursor: MonotonicCursor::new(column.monotonic, min, max, table.delta_rows),
        rng: ctx.rng,
    }))
}

/// Uniform floats in `[min, max]`, or a monotonic sequence.
pub struct RealGenerator {
    min: f64,
    max: f64,
    cursor: Option<MonotonicCursor>,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for RealGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        let value = match &mut self.cursor {
            Some(cursor) => cursor.next_value(&mut self.rng),
            None => self.rng.random_range(self.min..=self.max),
        };
        Ok(GeneratedValue::Float64(value))
    }
}

// ============================================================================
// bit
// ============================================================================

pub fn bit_entry() -> GeneratorEntry {
    GeneratorEntry {
        kind: GeneratorKind::Bit,
        engines: &[],
        validate: validate_bit,
        build: build_bit,
    }
}

fn bit_width(column: &Column) -> Result<u32, String> {
    let bits = required(column.max, "max", GeneratorKind::Bit)?;
    if !(1.0..=MAX_BITS).contains(&bits) {
        return Err(format!("bit width must be between 1 and {MAX_BITS}, got {bits}"));
    }
    Ok(bits as u32)
}

fn validate_bit(
    _table: &CustomizedTable,
    column: &Column,
    _ctx: &ValidationContext<'_>,
) -> Result<(), String> {
    bit_width(column).map(|_| ())
}

fn build_bit(
    _table: &CustomizedTable,
    column: &Column,
    ctx: BuildContext<'_>,
) -> Result<Box<dyn ValueGenerator>, String> {
    let bits = bit_width(column)?;
    Ok(Box::new(BitGenerator {
        max: (1i64 << bits) - 1,
        rng: ctx.rng,
    }))
}

/// Integers in `[0, 2^bits - 1]`.
pub struct BitGenerator {
    max: i64,
    rng: StdRng,
}

#[async_trait]
impl ValueGenerator for BitGenerator {
    fn generate(&mut self, _row_index: u64, _row: &Row) -> Result<GeneratedValue, FillError> {
        Ok(GeneratedValue::Int64(self.rng.random_range(0..=self.max)))
    }
}
