//! Parser for the SAS+ translator output format (version 3).
//!
//! The format is line-oriented: `begin_*`/`end_*` delimited sections for
//! the version, the cost metric, the variables, the mutex groups, the
//! initial state, the goal, the operators, and the axiom rules, in that
//! order. Malformed input is reported with the offending line number;
//! the parser never panics on bad input.

use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use thiserror::Error;

use fastward_core::{
    Action, Axiom, CostMetric, Effect, Fact, MutexGroup, PlanningTask, State, TaskError, Variable,
};

/// Errors from reading a SAS+ task file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read task file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected `{expected}`, found `{found}`")]
    Expected {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: expected an integer, found `{token}`")]
    BadInt { line: usize, token: String },

    #[error("unexpected end of file after line {line}")]
    UnexpectedEof { line: usize },

    #[error("unsupported translator version {version} (expected 3)")]
    UnsupportedVersion { version: i64 },

    #[error("line {line}: metric must be 0 or 1, found {value}")]
    BadMetric { line: usize, value: i64 },

    #[error("parsed task is malformed: {0}")]
    Invalid(#[from] TaskError),
}

/// Parses a task from a file on disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<PlanningTask, ParseError> {
    parse_str(&fs::read_to_string(path)?)
}

/// Parses a task from its textual encoding.
pub fn parse_str(input: &str) -> Result<PlanningTask, ParseError> {
    let mut reader = Reader::new(input);

    reader.expect("begin_version")?;
    let version = reader.int()?;
    if version != 3 {
        return Err(ParseError::UnsupportedVersion { version });
    }
    reader.expect("end_version")?;

    reader.expect("begin_metric")?;
    let (metric_line, metric_value) = reader.int_with_line()?;
    let metric = match metric_value {
        0 => CostMetric::Unit,
        1 => CostMetric::ActionCost,
        value => {
            return Err(ParseError::BadMetric {
                line: metric_line,
                value,
            })
        }
    };
    reader.expect("end_metric")?;

    let variables = parse_variables(&mut reader)?;
    let mutexes = parse_mutexes(&mut reader)?;
    let initial_state = parse_initial_state(&mut reader, variables.len())?;
    let goal = parse_goal(&mut reader)?;
    let actions = parse_actions(&mut reader)?;
    let axioms = parse_axioms(&mut reader)?;

    let task = PlanningTask {
        metric,
        variables,
        mutexes,
        initial_state,
        goal,
        actions,
        axioms,
    };
    task.validate()?;
    Ok(task)
}

fn parse_variables(reader: &mut Reader) -> Result<Vec<Variable>, ParseError> {
    let count = reader.int()? as usize;
    let mut variables = Vec::with_capacity(count);
    for _ in 0..count {
        reader.expect("begin_variable")?;
        let name = reader.line()?.to_owned();
        let axiom_layer = reader.int()? as i32;
        let range = reader.int()? as usize;
        let mut value_names = Vec::with_capacity(range);
        for _ in 0..range {
            value_names.push(reader.line()?.to_owned());
        }
        reader.expect("end_variable")?;
        variables.push(Variable {
            name,
            axiom_layer,
            range,
            value_names,
        });
    }
    Ok(variables)
}

fn parse_mutexes(reader: &mut Reader) -> Result<Vec<MutexGroup>, ParseError> {
    let count = reader.int()? as usize;
    let mut mutexes = Vec::with_capacity(count);
    for _ in 0..count {
        reader.expect("begin_mutex_group")?;
        let n_facts = reader.int()? as usize;
        let mut facts = Vec::with_capacity(n_facts);
        for _ in 0..n_facts {
            facts.push(reader.fact_line()?);
        }
        reader.expect("end_mutex_group")?;
        mutexes.push(MutexGroup { facts });
    }
    Ok(mutexes)
}

fn parse_initial_state(reader: &mut Reader, n_vars: usize) -> Result<State, ParseError> {
    reader.expect("begin_state")?;
    let mut values = Vec::with_capacity(n_vars);
    for _ in 0..n_vars {
        values.push(reader.int()? as i32);
    }
    reader.expect("end_state")?;
    Ok(State::new(values))
}

fn parse_goal(reader: &mut Reader) -> Result<Vec<Fact>, ParseError> {
    reader.expect("begin_goal")?;
    let count = reader.int()? as usize;
    let mut goal = Vec::with_capacity(count);
    for _ in 0..count {
        goal.push(reader.fact_line()?);
    }
    reader.expect("end_goal")?;
    Ok(goal)
}

fn parse_actions(reader: &mut Reader) -> Result<Vec<Action>, ParseError> {
    let count = reader.int()? as usize;
    let mut actions = Vec::with_capacity(count);
    for _ in 0..count {
        reader.expect("begin_operator")?;
        let name = reader.line()?.to_owned();

        let n_pre = reader.int()? as usize;
        let mut preconditions = SmallVec::with_capacity(n_pre);
        for _ in 0..n_pre {
            preconditions.push(reader.fact_line()?);
        }

        let n_effects = reader.int()? as usize;
        let mut effects = Vec::with_capacity(n_effects);
        for _ in 0..n_effects {
            effects.push(parse_effect(reader)?);
        }

        let cost = reader.int()? as u64;
        reader.expect("end_operator")?;
        actions.push(Action {
            name,
            preconditions,
            effects,
            cost,
        });
    }
    Ok(actions)
}

fn parse_effect(reader: &mut Reader) -> Result<Effect, ParseError> {
    let (line_no, line) = reader.line_with_no()?;
    let mut tokens = Tokens::new(line_no, line);
    let n_conds = tokens.int()? as usize;
    let mut conditions = SmallVec::with_capacity(n_conds);
    for _ in 0..n_conds {
        let var = tokens.int()? as usize;
        let value = tokens.int()? as i32;
        conditions.push(Fact::new(var, value));
    }
    let var = tokens.int()? as usize;
    let before = tokens.int()? as i32;
    let after = tokens.int()? as i32;
    Ok(Effect {
        conditions,
        var,
        before,
        after,
    })
}

fn parse_axioms(reader: &mut Reader) -> Result<Vec<Axiom>, ParseError> {
    let count = reader.int()? as usize;
    let mut axioms = Vec::with_capacity(count);
    for _ in 0..count {
        reader.expect("begin_rule")?;
        let n_conds = reader.int()? as usize;
        let mut conditions = SmallVec::with_capacity(n_conds);
        for _ in 0..n_conds {
            conditions.push(reader.fact_line()?);
        }
        let (line_no, line) = reader.line_with_no()?;
        let mut tokens = Tokens::new(line_no, line);
        let var = tokens.int()? as usize;
        let before = tokens.int()? as i32;
        let after = tokens.int()? as i32;
        reader.expect("end_rule")?;
        axioms.push(Axiom {
            conditions,
            var,
            before,
            after,
        });
    }
    Ok(axioms)
}

/// Line-at-a-time reader tracking the current line number.
struct Reader<'a> {
    lines: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines(),
            line_no: 0,
        }
    }

    fn line(&mut self) -> Result<&'a str, ParseError> {
        self.line_with_no().map(|(_, line)| line)
    }

    fn line_with_no(&mut self) -> Result<(usize, &'a str), ParseError> {
        match self.lines.next() {
            Some(line) => {
                self.line_no += 1;
                Ok((self.line_no, line.trim_end()))
            }
            None => Err(ParseError::UnexpectedEof { line: self.line_no }),
        }
    }

    fn expect(&mut self, tag: &'static str) -> Result<(), ParseError> {
        let (line, found) = self.line_with_no()?;
        if found == tag {
            Ok(())
        } else {
            Err(ParseError::Expected {
                line,
                expected: tag,
                found: found.to_owned(),
            })
        }
    }

    fn int(&mut self) -> Result<i64, ParseError> {
        self.int_with_line().map(|(_, value)| value)
    }

    fn int_with_line(&mut self) -> Result<(usize, i64), ParseError> {
        let (line, text) = self.line_with_no()?;
        let value = text.trim().parse().map_err(|_| ParseError::BadInt {
            line,
            token: text.to_owned(),
        })?;
        Ok((line, value))
    }

    /// Parses a `var value` pair on its own line.
    fn fact_line(&mut self) -> Result<Fact, ParseError> {
        let (line_no, line) = self.line_with_no()?;
        let mut tokens = Tokens::new(line_no, line);
        let var = tokens.int()? as usize;
        let value = tokens.int()? as i32;
        Ok(Fact::new(var, value))
    }
}

/// Whitespace-separated integer tokens within one line.
struct Tokens<'a> {
    line: usize,
    inner: std::str::SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(line: usize, text: &'a str) -> Self {
        Self {
            line,
            inner: text.split_whitespace(),
        }
    }

    fn int(&mut self) -> Result<i64, ParseError> {
        let token = self
            .inner
            .next()
            .ok_or(ParseError::UnexpectedEof { line: self.line })?;
        token.parse().map_err(|_| ParseError::BadInt {
            line: self.line,
            token: token.to_owned(),
        })
    }
}
