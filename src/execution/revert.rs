//! Wallet contract revert codes
//!
//! The contracts revert with short `GSxxx` strings. [`describe_revert`]
//! turns node error text into something a person can act on.

use serde::Serialize;

/// A recognised `GSxxx` revert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeRevert {
    pub code: &'static str,
    pub message: &'static str,
}

const REVERT_CODES: &[(&str, &str)] = &[
    // General init
    ("GS000", "Could not finish initialization"),
    ("GS001", "Threshold needs to be defined"),
    ("GS002", "A call to set up modules couldn't be executed because the destination account was not a contract"),
    // General gas/execution
    ("GS010", "Not enough gas to execute Safe transaction"),
    ("GS011", "Could not pay gas costs with ether"),
    ("GS012", "Could not pay gas costs with token"),
    ("GS013", "Safe transaction failed when gasPrice and safeTxGas were 0"),
    // General signature validation
    ("GS020", "Signatures data too short"),
    ("GS021", "Invalid contract signature location: inside static part"),
    ("GS022", "Invalid contract signature location: length not present"),
    ("GS023", "Invalid contract signature location: data not complete"),
    ("GS024", "Invalid contract signature provided"),
    ("GS025", "Hash has not been approved"),
    ("GS026", "Invalid owner provided"),
    // General auth
    ("GS030", "Only owners can approve a hash"),
    ("GS031", "Method can only be called from this contract"),
    // Module management
    ("GS100", "Modules have already been initialized"),
    ("GS101", "Invalid module address provided"),
    ("GS102", "Module has already been added"),
    ("GS103", "Invalid prevModule, module pair provided"),
    ("GS104", "Method can only be called from an enabled module"),
    ("GS105", "Invalid starting point for fetching paginated modules"),
    ("GS106", "Invalid page size for fetching paginated modules"),
    // Owner management
    ("GS200", "Owners have already been set up"),
    ("GS201", "Threshold cannot exceed owner count"),
    ("GS202", "Threshold needs to be greater than 0"),
    ("GS203", "Invalid owner address provided"),
    ("GS204", "Address is already an owner"),
    ("GS205", "Invalid prevOwner, owner pair provided"),
    // Guard management
    ("GS300", "Guard does not implement IERC165"),
    ("GS301", "Module Guard does not implement IERC165"),
    // Fallback handler
    ("GS400", "Fallback handler cannot be set to self"),
];

/// Look up one code such as `"GS026"`
pub fn revert_message(code: &str) -> Option<&'static str> {
    REVERT_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, message)| *message)
}

/// First known `GSxxx` code appearing anywhere in `text`
pub fn describe_revert(text: &str) -> Option<SafeRevert> {
    let bytes = text.as_bytes();
    (0..bytes.len().saturating_sub(4)).find_map(|i| {
        let candidate = text.get(i..i + 5)?;
        if !candidate.starts_with("GS") || !candidate[2..].bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        REVERT_CODES
            .iter()
            .find(|(code, _)| *code == candidate)
            .map(|&(code, message)| SafeRevert { code, message })
    })
}
