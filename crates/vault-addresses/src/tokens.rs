use std::{fmt, str::FromStr};

use ethers::types::{Address, U256};

lazy_static! {
    // The tokens that back the vaults. These are the Arbitrum One deployments
    // since the local network is a fork of Arbitrum One.
    static ref USDC: TokenDescriptor = TokenDescriptor {
        token: Token::Usdc,
        address: "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8".parse().unwrap(),
        decimals: 6,
    };
    static ref USDT: TokenDescriptor = TokenDescriptor {
        token: Token::Usdt,
        address: "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9".parse().unwrap(),
        decimals: 6,
    };
    static ref WETH: TokenDescriptor = TokenDescriptor {
        token: Token::Weth,
        address: "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".parse().unwrap(),
        decimals: 18,
    };
    static ref WBTC: TokenDescriptor = TokenDescriptor {
        token: Token::Wbtc,
        address: "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f".parse().unwrap(),
        decimals: 8,
    };
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Token {
    Usdc,
    Usdt,
    Weth,
    Wbtc,
}

impl Token {
    pub const ALL: [Token; 4] = [Token::Usdc, Token::Usdt, Token::Weth, Token::Wbtc];

    pub fn symbol(self) -> &'static str {
        match self {
            Token::Usdc => "USDC",
            Token::Usdt => "USDT",
            Token::Weth => "WETH",
            Token::Wbtc => "WBTC",
        }
    }

    pub fn descriptor(self) -> &'static TokenDescriptor {
        match self {
            Token::Usdc => &USDC,
            Token::Usdt => &USDT,
            Token::Weth => &WETH,
            Token::Wbtc => &WBTC,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Token {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::ALL
            .into_iter()
            .find(|token| token.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown token symbol {s:?}"))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenDescriptor {
    pub token: Token,
    pub address: Address,
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn symbol(&self) -> &'static str {
        self.token.symbol()
    }

    /// One whole token in base units.
    pub fn one_unit(&self) -> U256 {
        U256::exp10(self.decimals as usize)
    }

    /// Converts an amount of whole tokens into the token's base units.
    pub fn base_units(&self, whole_units: u64) -> U256 {
        U256::from(whole_units) * self.one_unit()
    }
}
