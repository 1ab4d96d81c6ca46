use sparkwire_frame::{BLOCK_SIZE, DATA_SIZE, MAX_MESSAGES, NUM_BLOCKS};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("sparkwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: sparkwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SPARKWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "wire: block={BLOCK_SIZE} blocks={NUM_BLOCKS} chunk_payload={DATA_SIZE} index={MAX_MESSAGES}"
    );

    Ok(SUCCESS)
}
