use crate::cmd::encode::build;
use crate::cmd::EncodeArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let (_, codec) = build(&args)?;
    print!("{}", codec.dump());
    Ok(SUCCESS)
}
