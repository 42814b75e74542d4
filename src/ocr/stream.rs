use std::io::{Read, Write};

use serde::Deserialize;

use crate::core::model::RawToken;
use crate::core::{Result, SlipError};

/// A token-stream row; extra columns such as `right` or `level` are ignored.
#[derive(Debug, Deserialize)]
struct TokenRow {
    text: Option<String>,
    conf: f32,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    block_num: u32,
    par_num: u32,
    line_num: u32,
}

/// Reads a recognition token stream in CSV form.
pub fn read_token_stream<R: Read>(reader: R) -> Result<Vec<RawToken>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut tokens = Vec::new();
    for (idx, row) in csv.deserialize::<TokenRow>().enumerate() {
        let row = row?;
        let Some(text) = row.text.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        let token = RawToken {
            text: text.trim().to_string(),
            conf: row.conf,
            left: row.left,
            top: row.top,
            width: row.width,
            height: row.height,
            block_num: row.block_num,
            par_num: row.par_num,
            line_num: row.line_num,
        };
        if !token.bbox().is_well_formed() {
            return Err(SlipError::TokenStream(format!(
                "record {}: negative box size",
                idx + 1
            )));
        }
        tokens.push(token);
    }
    Ok(tokens)
}

/// Writes tokens in the form `read_token_stream` accepts.
pub fn write_token_stream<W: Write>(writer: W, tokens: &[RawToken]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for token in tokens {
        csv.serialize(token)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_with_extra_columns_and_blank_text() {
        let data = "\
level,text,conf,left,top,width,height,block_num,par_num,line_num,right,bot
5,101,96.5,10,20,40,38,1,1,1,50,58
5,,30,60,20,10,38,1,1,1,70,58
5,Main Street,88,10,70,200,52,1,1,2,210,122
";
        let tokens = read_token_stream(data.as_bytes()).expect("stream");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "Main Street");
        assert_eq!(tokens[1].line_num, 2);
    }

    #[test]
    fn written_stream_reads_back() {
        let tokens = vec![RawToken {
            text: "45A".into(),
            conf: 91.0,
            left: 120,
            top: 31,
            width: 60,
            height: 39,
            block_num: 1,
            par_num: 2,
            line_num: 7,
        }];
        let mut buf = Vec::new();
        write_token_stream(&mut buf, &tokens).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("text,conf,left,top,width,height,block_num,par_num,line_num"));
        assert_eq!(read_token_stream(text.as_bytes()).expect("read"), tokens);
    }

    #[test]
    fn negative_sizes_are_rejected() {
        let data = "text,conf,left,top,width,height,block_num,par_num,line_num\n7,90,0,0,-3,10,1,1,1\n";
        assert!(matches!(
            read_token_stream(data.as_bytes()),
            Err(SlipError::TokenStream(_))
        ));
    }
}
