//! Terminal glyphs used by the command line tools.

use std::sync::LazyLock;

use console::{style, StyledObject};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// A green check mark.
pub static CHECKMARK: LazyLock<StyledObject<&'static str>> =
    LazyLock::new(|| style("✓").green().bold());

/// A red cross.
pub static CROSS: LazyLock<StyledObject<&'static str>> = LazyLock::new(|| style("✗").red().bold());
