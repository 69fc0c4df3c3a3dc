//! Recursive-descent parser for the policy grammar. Each non-terminal
//! method leaves the next unprocessed token in `self.next`.

use crate::ast::{BinOp, SyntaxNode};
use crate::error::PolicyError;
use crate::lexer::{Lexer, Token};

pub fn parse(source: &str) -> Result<SyntaxNode, PolicyError> {
    let mut parser = Parser::new(source);
    let root = parser.expr()?;
    match parser.next {
        Token::Eof => Ok(root),
        ref tok => Err(PolicyError::UnexpectedToken(format!("{tok:?}"))),
    }
}

struct Parser {
    lexer: Lexer,
    next: Token,
}

impl Parser {
    fn new(source: &str) -> Self {
        let mut lexer = Lexer::new(source);
        let next = lexer.next_token();
        Self { lexer, next }
    }

    fn advance(&mut self) {
        self.next = self.lexer.next_token();
    }

    /// `expr := factor ((and | or) factor)*`
    fn expr(&mut self) -> Result<SyntaxNode, PolicyError> {
        let mut node = self.factor()?;
        while matches!(self.next, Token::And | Token::Or) {
            let op = if self.next == Token::And {
                BinOp::And
            } else {
                BinOp::Or
            };
            self.advance();
            let right = self.factor()?;
            node = SyntaxNode::BinOp {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
        Ok(node)
    }

    /// `factor := ID | "(" expr ")"`
    fn factor(&mut self) -> Result<SyntaxNode, PolicyError> {
        match self.next.clone() {
            Token::Id(name) => {
                self.advance();
                Ok(SyntaxNode::Leaf(name))
            }
            Token::LParen => {
                self.advance();
                let node = self.expr()?;
                if self.next != Token::RParen {
                    return Err(PolicyError::UnexpectedToken(format!("{:?}", self.next)));
                }
                self.advance();
                Ok(node)
            }
            Token::Eof => Err(PolicyError::UnexpectedEnd),
            tok => Err(PolicyError::UnexpectedToken(format!("{tok:?}"))),
        }
    }
}
