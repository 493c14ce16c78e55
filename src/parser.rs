//! This module provides the parser for machine descriptions, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a `Program` struct.
//!
//! A description is read in two passes over the same text. The header (every section up to
//! and including `#N`) is parsed first so that misplaced or missing sections are reported
//! before anything else; the transition list that follows is parsed only once the header is
//! known to be complete.

use crate::{
    machine::TuringMachine,
    types::{Direction, Program, State, Transition, TuringMachineError, MAX_TAPES, WILDCARD},
};
use pest::{
    error::{Error, ErrorVariant, InputLocation},
    iterators::{Pair, Pairs},
    Parser as PestParser, Position, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;
use tracing::debug;

/// Derives a `PestParser` for the description grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Sections that must all appear, once each, before `#N`.
const SECTIONS: [Rule; 6] = [
    Rule::states,
    Rule::input_symbols,
    Rule::tape_symbols,
    Rule::initial_state,
    Rule::blank,
    Rule::final_states,
];

/// Parses the given description into a `Program`.
///
/// # Arguments
///
/// * `input` - A string slice containing the machine description.
///
/// # Returns
///
/// * `Ok(Program)` if the input is a complete, well-formed description.
/// * `Err(TuringMachineError::SyntaxError)` on the first token or section mismatch.
/// * `Err(TuringMachineError::StructuralError)` if the tape count is invalid or a transition
///   does not address every tape.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    DocumentParser::new(input).parse()
}

/// Parses a description and builds a machine with `word` on its first tape.
///
/// `word` is checked against the declared input alphabet before the machine is created.
pub fn parse_machine(
    input: &str,
    word: &str,
) -> Result<(Program, TuringMachine), TuringMachineError> {
    let program = parse(input)?;
    let machine = TuringMachine::new(&program, word)?;

    Ok((program, machine))
}

/// Accumulates the header sections as they are encountered.
#[derive(Default)]
struct Header {
    states: Option<Vec<State>>,
    input_symbols: Option<Vec<char>>,
    tape_symbols: Option<Vec<char>>,
    initial_state: Option<State>,
    blank: Option<char>,
    final_states: Option<Vec<State>>,
}

/// Owns the text being parsed and the offset the transition list starts at.
///
/// Spans handed out by the second pass are relative to that offset; every error raised
/// through [`DocumentParser::error`] is mapped back onto the whole document.
struct DocumentParser<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> DocumentParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    fn parse(mut self) -> Result<Program, TuringMachineError> {
        let pairs = TuringMachineParser::parse(Rule::header, self.input)
            .map_err(|e| TuringMachineError::SyntaxError(Box::new(e)))?;

        let mut header = Header::default();
        let mut seen = HashSet::new();
        let mut tapes = None;

        for pair in pairs.flat_map(Pair::into_inner) {
            let span = pair.as_span();
            let rule = pair.as_rule();

            if rule == Rule::tape_count {
                self.check_complete(&seen, span)?;
                tapes = Some(self.parse_tape_count(pair)?);
                self.offset = span.end();
                continue;
            }

            self.check_unique_section(rule, span, &mut seen)?;

            match rule {
                Rule::states => header.states = Some(parse_states(pair)),
                Rule::input_symbols => header.input_symbols = Some(self.parse_symbol_set(pair)?),
                Rule::tape_symbols => header.tape_symbols = Some(self.parse_symbol_set(pair)?),
                Rule::initial_state => header.initial_state = parse_states(pair).into_iter().next(),
                Rule::blank => header.blank = Some(self.parse_blank(pair)?),
                Rule::final_states => header.final_states = Some(parse_states(pair)),
                _ => {} // Skip other rules
            }
        }

        let tapes = check_required_section(tapes, "#N")?;
        let transitions = self.parse_transitions(tapes)?;

        debug!(
            tapes,
            transitions = transitions.len(),
            "parsed machine description"
        );

        Ok(Program {
            states: check_required_section(header.states, "#Q")?,
            input_symbols: check_required_section(header.input_symbols, "#S")?,
            tape_symbols: check_required_section(header.tape_symbols, "#G")?,
            initial_state: check_required_section(header.initial_state, "#q0")?,
            blank: check_required_section(header.blank, "#B")?,
            final_states: check_required_section(header.final_states, "#F")?,
            tapes,
            transitions,
        })
    }

    /// Parses everything after `#N` as the transition list.
    fn parse_transitions(&self, tapes: usize) -> Result<Vec<Transition>, TuringMachineError> {
        let input: &'a str = self.input;
        let body = &input[self.offset..];
        let pairs = TuringMachineParser::parse(Rule::transitions, body)
            .map_err(|e| self.relocate(e))?;

        pairs
            .flat_map(Pair::into_inner)
            .filter(|pair| pair.as_rule() == Rule::transition)
            .map(|pair| self.parse_transition(pair, tapes))
            .collect()
    }

    /// Parses a single `STATE SYMBOLS SYMBOLS DIRECTIONS STATE` tuple.
    fn parse_transition(
        &self,
        pair: Pair<'a, Rule>,
        tapes: usize,
    ) -> Result<Transition, TuringMachineError> {
        let span = pair.as_span();
        let mut pairs = pair.into_inner();

        let state = State::from(self.next_pair(&mut pairs, span)?.as_str());
        let read: Vec<char> = self.next_pair(&mut pairs, span)?.as_str().chars().collect();
        let write: Vec<char> = self.next_pair(&mut pairs, span)?.as_str().chars().collect();
        let directions = self.parse_directions(self.next_pair(&mut pairs, span)?)?;
        let next_state = State::from(self.next_pair(&mut pairs, span)?.as_str());

        // Validate that every list addresses each tape exactly once
        if read.len() != tapes || write.len() != tapes || directions.len() != tapes {
            let (line, column) = self.line_col(span);
            return Err(TuringMachineError::StructuralError(format!(
                "Inconsistent transition at line {line}, column {column}: \
                 read={}, write={}, directions={} for {tapes} tape(s)",
                read.len(),
                write.len(),
                directions.len(),
            )));
        }

        Ok(Transition {
            state,
            read,
            write,
            directions,
            next_state,
        })
    }

    /// Parses a run of direction characters, one per tape.
    fn parse_directions(&self, pair: Pair<'a, Rule>) -> Result<Vec<Direction>, TuringMachineError> {
        let span = pair.as_span();

        pair.as_str()
            .chars()
            .map(|c| {
                Direction::try_from(c)
                    .map_err(|c| self.error(format!("Unsupported direction: {c}"), span))
            })
            .collect()
    }

    fn parse_tape_count(&self, pair: Pair<'a, Rule>) -> Result<usize, TuringMachineError> {
        let span = pair.as_span();
        let count = pair
            .into_inner()
            .next()
            .ok_or_else(|| self.error("Expected a tape count", span))?
            .as_str();

        match count.parse::<usize>() {
            Ok(0) => Err(TuringMachineError::StructuralError(
                "Tape count must be at least 1".to_string(),
            )),
            Ok(n) if n > MAX_TAPES => Err(TuringMachineError::StructuralError(format!(
                "Tape count {n} exceeds the maximum of {MAX_TAPES}"
            ))),
            Ok(n) => Ok(n),
            Err(e) => Err(TuringMachineError::StructuralError(format!(
                "Invalid tape count {count}: {e}"
            ))),
        }
    }

    /// Parses an alphabet, requiring each entry to be a single character.
    fn parse_symbol_set(&self, pair: Pair<'a, Rule>) -> Result<Vec<char>, TuringMachineError> {
        pair.into_inner()
            .map(|id| {
                let mut chars = id.as_str().chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => Ok(symbol),
                    _ => Err(self.error(
                        format!("Symbol '{}' must be a single character", id.as_str()),
                        id.as_span(),
                    )),
                }
            })
            .collect()
    }

    fn parse_blank(&self, pair: Pair<'a, Rule>) -> Result<char, TuringMachineError> {
        let span = pair.as_span();
        let blank = pair
            .into_inner()
            .next()
            .and_then(|symbol| symbol.as_str().chars().next())
            .ok_or_else(|| self.error("Expected a blank symbol", span))?;

        if blank == WILDCARD {
            return Err(self.error(
                format!("The blank symbol cannot be the wildcard '{WILDCARD}'"),
                span,
            ));
        }

        Ok(blank)
    }

    /// Checks that every section has been declared before `#N`.
    fn check_complete(&self, seen: &HashSet<Rule>, span: Span<'a>) -> Result<(), TuringMachineError> {
        if seen.len() == SECTIONS.len() {
            return Ok(());
        }

        let missing = SECTIONS
            .iter()
            .filter(|&rule| !seen.contains(rule))
            .map(|&rule| format!("'{}'", section_tag(rule)))
            .collect::<Vec<_>>()
            .join(", ");

        Err(self.error(
            format!("Expected complete machine description before '#N', missing {missing}"),
            span,
        ))
    }

    /// Checks if a given section has already been declared.
    fn check_unique_section(
        &self,
        rule: Rule,
        span: Span<'a>,
        seen: &mut HashSet<Rule>,
    ) -> Result<(), TuringMachineError> {
        if !SECTIONS.contains(&rule) {
            return Ok(());
        }

        if !seen.insert(rule) {
            return Err(self.error(
                format!("Duplicate \"{}\" declaration", section_tag(rule)),
                span,
            ));
        }

        Ok(())
    }

    fn next_pair(
        &self,
        pairs: &mut Pairs<'a, Rule>,
        span: Span<'a>,
    ) -> Result<Pair<'a, Rule>, TuringMachineError> {
        pairs
            .next()
            .ok_or_else(|| self.error("Incomplete transition", span))
    }

    /// Creates a `TuringMachineError::SyntaxError` from a message and a `Span`.
    fn error(&self, message: impl Into<String>, span: Span<'a>) -> TuringMachineError {
        let span = Span::new(
            self.input,
            self.offset + span.start(),
            self.offset + span.end(),
        )
        .unwrap_or(span);

        TuringMachineError::SyntaxError(Box::new(Error::new_from_span(
            ErrorVariant::CustomError {
                message: message.into(),
            },
            span,
        )))
    }

    /// Moves an error raised while parsing the transition list onto the whole document.
    fn relocate(&self, error: Error<Rule>) -> TuringMachineError {
        let start = match error.location {
            InputLocation::Pos(pos) => pos,
            InputLocation::Span((start, _)) => start,
        };

        let error = match Position::new(self.input, self.offset + start) {
            Some(position) => Error::new_from_pos(error.variant, position),
            None => error,
        };

        TuringMachineError::SyntaxError(Box::new(error))
    }

    fn line_col(&self, span: Span<'a>) -> (usize, usize) {
        Position::new(self.input, self.offset + span.start())
            .map_or_else(|| span.start_pos().line_col(), |position| position.line_col())
    }
}

/// Collects the state names of a `#Q`, `#F` or `#q0` section.
fn parse_states(pair: Pair<Rule>) -> Vec<State> {
    pair.into_inner()
        .filter(|id| id.as_rule() == Rule::id)
        .map(|id| State::from(id.as_str()))
        .collect()
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_section<T>(value: Option<T>, tag: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::StructuralError(format!("Missing '{tag}' section")))
}

fn section_tag(rule: Rule) -> &'static str {
    match rule {
        Rule::states => "#Q",
        Rule::input_symbols => "#S",
        Rule::tape_symbols => "#G",
        Rule::initial_state => "#q0",
        Rule::blank => "#B",
        Rule::final_states => "#F",
        Rule::tape_count => "#N",
        _ => "?",
    }
}
