//! `tuick --format COMMAND [ARGS…]`: run COMMAND, emit the block-stream
//! serialisation to stdout, exit. No finder, no watcher, no control
//! endpoint — used by build tooling that wants the raw stream.

use tokio::io::{AsyncWriteExt, stdout};
use tuick_core::{GenerationId, Result, TuickError};
use tuick_errorformat::{CompiledPattern, resolve_recipe};
use tuick_runtime::CheckerRun;

pub async fn run(command: Vec<String>, tool: &str, pattern: Option<&str>) -> Result<()> {
    let explicit_tool = (tool != "auto").then_some(tool);
    let recipe = resolve_recipe(&command, explicit_tool, pattern)?;
    let compiled = CompiledPattern::compile(&recipe.pattern)?;

    let mut checker = CheckerRun::spawn(GenerationId::FIRST, &command, Some(compiled), None)?;
    let mut out = stdout();

    while let Some(block) = checker
        .parser
        .next_block()
        .await
        .map_err(TuickError::Io)?
    {
        let encoded = block.sanitized().encode()?;
        out.write_all(&encoded).await.map_err(TuickError::Io)?;
    }
    out.flush().await.map_err(TuickError::Io)?;

    checker.await_exit().await?;
    Ok(())
}
