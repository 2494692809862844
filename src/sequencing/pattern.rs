use crate::error::{Error, PresetError};
use crate::sequencing::timing::{StepUnit, Tempo};

/// Highest bar count a pattern can be resized to.
pub const MAX_BARS: usize = 4;

/*
Pattern Grid
============

A pattern is a rows × steps grid of velocities, stored row-major in one flat
vector:

          step 0   step 1   step 2   ...
  row 0  [ 0.0  ,  1.0   ,  0.0  , ... ]
  row 1  [ 0.8  ,  0.0   ,  0.0  , ... ]

A velocity of 0.0 is an inactive cell. `toggle` flips between 0.0 and full
velocity, so toggling twice always restores the original state.

steps = steps_per_bar × bars. Changing the bar count reallocates the grid:
the columns both sizes share are copied over, any new columns start empty.

The pattern never knows about time or audio. The sequencer reads it and the
session edits it.
*/

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    rows: Vec<String>,
    steps_per_bar: usize,
    bars: usize,
    cells: Vec<f32>,
    tempo: Tempo,
    step_unit: StepUnit,
}

impl Pattern {
    /// Empty pattern. `bars` is clamped to `1..=MAX_BARS`, `steps_per_bar`
    /// to at least one.
    pub fn new(rows: Vec<String>, steps_per_bar: usize, bars: usize) -> Self {
        let steps_per_bar = steps_per_bar.max(1);
        let bars = bars.clamp(1, MAX_BARS);
        Self {
            cells: vec![0.0; rows.len() * steps_per_bar * bars],
            rows,
            steps_per_bar,
            bars,
            tempo: Tempo::DEFAULT,
            step_unit: StepUnit::default(),
        }
    }

    pub fn with_tempo(mut self, tempo: Tempo) -> Self {
        self.tempo = tempo;
        self
    }

    pub fn with_step_unit(mut self, step_unit: StepUnit) -> Self {
        self.step_unit = step_unit;
        self
    }

    /// Build from a boolean grid indexed `[row][step]`.
    ///
    /// The grid must have exactly one row per entry in `rows` and
    /// `steps_per_bar * bars` steps in every row.
    pub fn from_grid(
        name: &'static str,
        rows: Vec<String>,
        steps_per_bar: usize,
        bars: usize,
        grid: &[Vec<bool>],
    ) -> Result<Self, PresetError> {
        let mut pattern = Self::new(rows, steps_per_bar, bars);
        let steps = pattern.steps();

        if grid.len() != pattern.row_count() {
            return Err(PresetError::RowCount {
                grid: name,
                expected: pattern.row_count(),
                actual: grid.len(),
            });
        }

        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != steps {
                return Err(PresetError::StepCount {
                    grid: name,
                    row,
                    expected: steps,
                    actual: cells.len(),
                });
            }
            for (step, &active) in cells.iter().enumerate() {
                if active {
                    pattern.cells[row * steps + step] = 1.0;
                }
            }
        }

        Ok(pattern)
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn steps_per_bar(&self) -> usize {
        self.steps_per_bar
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    pub fn steps(&self) -> usize {
        self.steps_per_bar * self.bars
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn step_unit(&self) -> StepUnit {
        self.step_unit
    }

    /// Seconds one step lasts at the pattern tempo.
    pub fn step_duration(&self) -> f64 {
        self.step_unit.duration(self.tempo)
    }

    fn index(&self, row: usize, step: usize) -> Result<usize, Error> {
        if row >= self.row_count() || step >= self.steps() {
            return Err(Error::CellOutOfRange {
                row,
                step,
                rows: self.row_count(),
                steps: self.steps(),
            });
        }
        Ok(row * self.steps() + step)
    }

    /// Velocity at a cell, 0.0 when inactive or out of range.
    pub fn velocity(&self, row: usize, step: usize) -> f32 {
        self.index(row, step).map_or(0.0, |i| self.cells[i])
    }

    pub fn is_active(&self, row: usize, step: usize) -> bool {
        self.velocity(row, step) > 0.0
    }

    /// Flip a cell between off and full velocity. Returns the new state.
    pub fn toggle(&mut self, row: usize, step: usize) -> Result<bool, Error> {
        let i = self.index(row, step)?;
        let active = self.cells[i] <= 0.0;
        self.cells[i] = if active { 1.0 } else { 0.0 };
        Ok(active)
    }

    /// Set a cell's velocity, clamped to `0.0..=1.0`.
    pub fn set_velocity(&mut self, row: usize, step: usize, velocity: f32) -> Result<(), Error> {
        let i = self.index(row, step)?;
        self.cells[i] = velocity.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Resize to `bars` (clamped to `1..=MAX_BARS`), keeping the shared
    /// columns and zero-filling new ones.
    pub fn set_bars(&mut self, bars: usize) {
        let bars = bars.clamp(1, MAX_BARS);
        if bars == self.bars {
            return;
        }

        let old_steps = self.steps();
        let new_steps = self.steps_per_bar * bars;
        let kept = old_steps.min(new_steps);

        let mut cells = vec![0.0; self.row_count() * new_steps];
        for row in 0..self.row_count() {
            let src = &self.cells[row * old_steps..row * old_steps + kept];
            cells[row * new_steps..row * new_steps + kept].copy_from_slice(src);
        }

        self.cells = cells;
        self.bars = bars;
    }

    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
    }

    /// Rename the rows, keeping every cell. Ignored unless the row count
    /// matches.
    pub fn relabel(&mut self, rows: Vec<String>) -> bool {
        if rows.len() != self.rows.len() {
            return false;
        }
        self.rows = rows;
        true
    }

    /// Active rows in a column with their velocities.
    pub fn active_rows(&self, step: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let steps = self.steps();
        let column = (step < steps).then_some(step);
        (0..self.row_count()).filter_map(move |row| {
            let step = column?;
            let velocity = self.cells[row * steps + step];
            (velocity > 0.0).then_some((row, velocity))
        })
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v > 0.0).count()
    }

    /// Boolean view indexed `[row][step]`.
    pub fn to_grid(&self) -> Vec<Vec<bool>> {
        self.cells
            .chunks(self.steps())
            .map(|row| row.iter().map(|&v| v > 0.0).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("row{}", i)).collect()
    }

    #[test]
    fn dimensions_follow_bars() {
        let pattern = Pattern::new(rows(3), 8, 2);
        assert_eq!(pattern.steps(), 16);
        assert_eq!(pattern.to_grid().len(), 3);
        assert!(pattern.to_grid().iter().all(|row| row.len() == 16));
    }

    #[test]
    fn toggle_twice_round_trips_every_cell() {
        let mut pattern = Pattern::new(rows(4), 8, 1);
        pattern.toggle(1, 3).unwrap();
        pattern.set_velocity(2, 5, 0.4).unwrap();
        let original = pattern.clone();

        for row in 0..4 {
            for step in 0..8 {
                pattern.toggle(row, step).unwrap();
                pattern.toggle(row, step).unwrap();
                assert_eq!(
                    pattern.is_active(row, step),
                    original.is_active(row, step),
                    "cell ({}, {})",
                    row,
                    step
                );
            }
        }
    }

    #[test]
    fn toggle_out_of_range_is_rejected() {
        let mut pattern = Pattern::new(rows(2), 8, 1);
        assert_eq!(
            pattern.toggle(2, 0),
            Err(Error::CellOutOfRange {
                row: 2,
                step: 0,
                rows: 2,
                steps: 8
            })
        );
        assert!(pattern.toggle(0, 8).is_err());
    }

    #[test]
    fn growing_preserves_and_zero_fills() {
        let mut pattern = Pattern::new(rows(2), 4, 1);
        for step in 0..4 {
            pattern.toggle(0, step).unwrap();
        }
        pattern.set_velocity(1, 2, 0.5).unwrap();

        pattern.set_bars(3);

        assert_eq!(pattern.steps(), 12);
        for step in 0..4 {
            assert!(pattern.is_active(0, step));
        }
        assert_eq!(pattern.velocity(1, 2), 0.5);
        for row in 0..2 {
            for step in 4..12 {
                assert_eq!(pattern.velocity(row, step), 0.0);
            }
        }
    }

    #[test]
    fn shrinking_keeps_leading_bars() {
        let mut pattern = Pattern::new(rows(1), 4, 2);
        pattern.toggle(0, 1).unwrap();
        pattern.toggle(0, 6).unwrap();

        pattern.set_bars(1);

        assert_eq!(pattern.to_grid(), vec![vec![false, true, false, false]]);
    }

    #[test]
    fn bars_are_clamped() {
        let mut pattern = Pattern::new(rows(1), 8, 0);
        assert_eq!(pattern.bars(), 1);
        pattern.set_bars(9);
        assert_eq!(pattern.bars(), MAX_BARS);
    }

    #[test]
    fn from_grid_checks_shape() {
        let grid = vec![vec![true, false], vec![false, true]];
        let pattern = Pattern::from_grid("melodyGrid", rows(2), 2, 1, &grid).unwrap();
        assert_eq!(pattern.to_grid(), grid);

        let err = Pattern::from_grid("melodyGrid", rows(3), 2, 1, &grid).unwrap_err();
        assert_eq!(
            err,
            PresetError::RowCount {
                grid: "melodyGrid",
                expected: 3,
                actual: 2
            }
        );

        let ragged = vec![vec![true, false], vec![true]];
        assert!(matches!(
            Pattern::from_grid("rhythmGrid", rows(2), 2, 1, &ragged),
            Err(PresetError::StepCount { row: 1, .. })
        ));
    }

    #[test]
    fn active_rows_lists_column() {
        let mut pattern = Pattern::new(rows(3), 4, 1);
        pattern.toggle(0, 2).unwrap();
        pattern.set_velocity(2, 2, 0.3).unwrap();

        let active: Vec<_> = pattern.active_rows(2).collect();
        assert_eq!(active, vec![(0, 1.0), (2, 0.3)]);
        assert_eq!(pattern.active_rows(99).count(), 0);
    }

    #[test]
    fn clear_empties_grid() {
        let mut pattern = Pattern::new(rows(8), 8, 1);
        for row in 0..8 {
            for step in 0..8 {
                pattern.toggle(row, step).unwrap();
            }
        }
        assert_eq!(pattern.active_count(), 64);

        pattern.clear();
        assert_eq!(pattern.active_count(), 0);
    }
}
