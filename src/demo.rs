//! Illustrative vulnerable contract served by the example endpoint.

pub const EXAMPLE_CONTRACT: &str = r#"pragma solidity ^0.8.0;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import "@openzeppelin/contracts/access/Ownable.sol";

contract RiskyToken is ERC20, Ownable {
    mapping(address => bool) private _blacklisted;
    bool public tradingEnabled = false;
    uint256 public maxTransactionAmount;
    address private _hiddenOwner;

    constructor() ERC20("Risky Token", "RISKY") {
        _mint(msg.sender, 1000000 * 10**decimals());
        maxTransactionAmount = totalSupply();
        _hiddenOwner = msg.sender;
    }

    function blacklist(address account) external onlyOwner {
        _blacklisted[account] = true;
    }

    function setMaxTransactionAmount(uint256 amount) external onlyOwner {
        maxTransactionAmount = amount;
    }

    function enableTrading() external onlyOwner {
        tradingEnabled = true;
    }

    function executeMint(address to, uint256 amount) external {
        require(msg.sender == _hiddenOwner, "Not hidden owner");
        _mint(to, amount);
    }

    function _beforeTokenTransfer(address from, address to, uint256 amount)
        internal
        override
    {
        require(!_blacklisted[from] && !_blacklisted[to], "Blacklisted");
        if (from != owner() && to != owner()) {
            require(tradingEnabled, "Trading not enabled");
            require(amount <= maxTransactionAmount, "Amount exceeds max");
        }
        super._beforeTokenTransfer(from, to, amount);
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::StaticAnalyzer;
    use crate::types::{AnalysisRequest, Severity};

    #[test]
    fn test_example_contract_is_flagged() {
        let analyzer = StaticAnalyzer::new().unwrap();
        let draft = analyzer.analyze(&AnalysisRequest::new(EXAMPLE_CONTRACT)).unwrap();

        assert_eq!(draft.contract_name, "RiskyToken");
        assert_eq!(draft.overall_risk, Severity::Critical);

        let fired: Vec<(&str, usize)> = draft
            .vulnerabilities
            .iter()
            .map(|v| (v.rule_id.as_str(), v.line_start))
            .collect();
        assert!(fired.contains(&("BACKDOOR-001", 10)));
        assert!(fired.contains(&("BACKDOOR-002", 31)));
        assert!(fired.contains(&("BACKDOOR-005", 30)));
        assert!(fired.contains(&("PRIV-001", 18)));
        assert!(fired.contains(&("PRIV-002", 22)));
        assert!(fired.contains(&("PRIV-003", 26)));
        assert!(fired.contains(&("PRIV-005", 40)));
        assert!(fired.contains(&("PRIV-006", 39)));
    }
}
