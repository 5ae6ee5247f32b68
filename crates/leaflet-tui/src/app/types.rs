/// Everything a key press can ask for. Arrow and page keys resolve to
/// different commands per mode, so translation happens in `from_key`
/// and the rest of the app never looks at key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Exit,
    Switch,
    LineDown,
    LineUp,
    PageDown,
    PageUp,
    OpenImages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}
