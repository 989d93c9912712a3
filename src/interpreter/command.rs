use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::{MarketCap, Price, Symbol, Volume};

/// One parsed command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Add {
        symbol: Symbol,
        price: Price,
        volume: Volume,
        market_cap: MarketCap,
    },
    Remove {
        symbol: Symbol,
    },
    Search {
        symbol: Symbol,
    },
    Update {
        symbol: Symbol,
        new_symbol: Symbol,
        price: Price,
        volume: Volume,
        market_cap: MarketCap,
    },
    Print,
}

impl Command {
    /// Parse a whitespace-separated command line.
    ///
    /// Tokens past the ones a command needs are ignored.
    pub fn parse(line: &str) -> StoreResult<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (name, args) = tokens.split_first().ok_or(StoreError::EmptyCommand)?;

        match *name {
            "ADD" => {
                require(name, args, 4)?;
                Ok(Command::Add {
                    symbol: args[0].to_string(),
                    price: parse_field("price", args[1])?,
                    volume: parse_field("volume", args[2])?,
                    market_cap: parse_field("market_cap", args[3])?,
                })
            }
            "REMOVE" => {
                require(name, args, 1)?;
                Ok(Command::Remove {
                    symbol: args[0].to_string(),
                })
            }
            "SEARCH" => {
                require(name, args, 1)?;
                Ok(Command::Search {
                    symbol: args[0].to_string(),
                })
            }
            "UPDATE" => {
                require(name, args, 5)?;
                Ok(Command::Update {
                    symbol: args[0].to_string(),
                    new_symbol: args[1].to_string(),
                    price: parse_field("price", args[2])?,
                    volume: parse_field("volume", args[3])?,
                    market_cap: parse_field("market_cap", args[4])?,
                })
            }
            "PRINT" => Ok(Command::Print),
            other => Err(StoreError::UnknownCommand(other.to_string())),
        }
    }

    /// Command keyword as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "ADD",
            Command::Remove { .. } => "REMOVE",
            Command::Search { .. } => "SEARCH",
            Command::Update { .. } => "UPDATE",
            Command::Print => "PRINT",
        }
    }
}

impl FromStr for Command {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

fn require(command: &str, args: &[&str], expected: usize) -> StoreResult<()> {
    if args.len() < expected {
        return Err(StoreError::MissingArguments {
            command: command.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> StoreResult<T> {
    value.parse().map_err(|_| StoreError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    })
}
