use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("schemagate {}", env!("CARGO_PKG_VERSION"));
    if !args.extended {
        return Ok(SUCCESS);
    }

    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "target: {}",
        option_env!("SCHEMAGATE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("drafts: 4, 6, 7, 2019-09, 2020-12");

    Ok(SUCCESS)
}
