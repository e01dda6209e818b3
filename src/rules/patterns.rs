//! Built-in rugpull detection patterns for Solidity source.

use super::Rule;
use crate::types::{Category, Severity};

/// Returns the built-in catalog, in the order findings are reported.
pub fn builtin_rules() -> Vec<Rule> {
    let mut rules = Vec::new();

    // ==================== BACKDOORS ====================

    rules.push(Rule {
        id: "BACKDOOR-001".to_string(),
        name: "Hidden owner variable".to_string(),
        description: "A private address variable named like a secondary or hidden owner.".to_string(),
        category: Category::Backdoor,
        severity: Severity::High,
        pattern: r"address\s+(?:private|internal)\s+_?(?:hidden|secret|shadow|backup)\w*".to_string(),
        deep_scan: false,
        impact: "A second, undisclosed account may keep control after ownership is renounced.".to_string(),
        recommendation: "Remove secondary owner addresses or expose them publicly through Ownable/AccessControl.".to_string(),
    });

    rules.push(Rule {
        id: "BACKDOOR-002".to_string(),
        name: "Hidden owner authorization".to_string(),
        description: "Access check against a hidden owner address instead of the public owner.".to_string(),
        category: Category::Backdoor,
        severity: Severity::Critical,
        pattern: r"require\s*\(\s*msg\.sender\s*==\s*_?(?:hidden|secret|shadow|backup)\w*".to_string(),
        deep_scan: false,
        impact: "The hidden account can call privileged functions that holders believe are locked.".to_string(),
        recommendation: "Gate privileged functions with a publicly visible owner or role.".to_string(),
    });

    rules.push(Rule {
        id: "BACKDOOR-003".to_string(),
        name: "Self-destruct".to_string(),
        description: "The contract can destroy itself and forward its balance.".to_string(),
        category: Category::Backdoor,
        severity: Severity::Critical,
        pattern: r"selfdestruct\s*\([^)]*\)".to_string(),
        deep_scan: false,
        impact: "All ETH held by the contract can be sent to one address and the code removed.".to_string(),
        recommendation: "Remove selfdestruct; it is deprecated and has no place in a token contract.".to_string(),
    });

    rules.push(Rule {
        id: "BACKDOOR-004".to_string(),
        name: "Delegatecall".to_string(),
        description: "delegatecall runs foreign code against this contract's storage.".to_string(),
        category: Category::Backdoor,
        severity: Severity::High,
        pattern: r"\.delegatecall\s*\(".to_string(),
        deep_scan: false,
        impact: "Whoever controls the target can rewrite balances, owners or any other storage slot.".to_string(),
        recommendation: "Restrict delegatecall to immutable, audited implementation addresses.".to_string(),
    });

    rules.push(Rule {
        id: "BACKDOOR-005".to_string(),
        name: "Direct mint path".to_string(),
        description: "A mint-style external function calls _mint directly.".to_string(),
        category: Category::Backdoor,
        severity: Severity::Critical,
        pattern: r"function\s+\w*[Mm]int\w*\s*\([^)]*\)\s*(?:external|public)[^{;]*\{[^}]*_mint\s*\(".to_string(),
        deep_scan: false,
        impact: "New tokens can be created at will, diluting every holder.".to_string(),
        recommendation: "Cap the total supply and remove post-deployment minting, or put it behind a timelocked DAO.".to_string(),
    });

    rules.push(Rule {
        id: "BACKDOOR-006".to_string(),
        name: "Owner balance sweep".to_string(),
        description: "An owner-only function withdraws the contract's entire balance.".to_string(),
        category: Category::Backdoor,
        severity: Severity::High,
        pattern: r"function\s+\w*(?:[Ww]ithdraw|[Dd]rain|[Rr]escue|[Ss]weep)\w*\s*\([^)]*\)[^{;]*onlyOwner[^{;]*\{[^}]*(?:address\s*\(\s*this\s*\)\s*\.balance|balanceOf\s*\(\s*address\s*\(\s*this\s*\)\s*\))".to_string(),
        deep_scan: true,
        impact: "Liquidity or fees collected by the contract can be drained in one transaction.".to_string(),
        recommendation: "Limit withdrawals to accounted fees and send them to a multisig treasury.".to_string(),
    });

    // ==================== PRIVILEGED FUNCTIONS ====================

    rules.push(Rule {
        id: "PRIV-001".to_string(),
        name: "Blacklist function".to_string(),
        description: "The owner can block individual addresses.".to_string(),
        category: Category::Privileged,
        severity: Severity::High,
        pattern: r"(?i)function\s+(?:blacklist|addToBlacklist|setBlacklist|blockAddress|ban)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Holders can be prevented from selling or transferring at the owner's discretion.".to_string(),
        recommendation: "Remove blacklisting, or restrict it to sanctioned addresses through a governed process.".to_string(),
    });

    rules.push(Rule {
        id: "PRIV-002".to_string(),
        name: "Adjustable transaction limit".to_string(),
        description: "The owner can change maximum transaction or wallet sizes.".to_string(),
        category: Category::Privileged,
        severity: Severity::Medium,
        pattern: r"function\s+set(?:Max|Min)(?:Tx|Transaction|Wallet|Sell|Buy)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Setting the limit to zero freezes all trading for ordinary holders.".to_string(),
        recommendation: "Enforce a lower bound on limits or make them immutable after launch.".to_string(),
    });

    rules.push(Rule {
        id: "PRIV-003".to_string(),
        name: "Trading switch".to_string(),
        description: "Trading can be enabled or disabled by a privileged account.".to_string(),
        category: Category::Privileged,
        severity: Severity::High,
        pattern: r"function\s+(?:enable|disable|start|stop|open|close|set)Trading\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Buyers can be let in and then locked out of selling.".to_string(),
        recommendation: "Make enabling trading one-way and impossible to revert.".to_string(),
    });

    rules.push(Rule {
        id: "PRIV-004".to_string(),
        name: "Pausable transfers".to_string(),
        description: "Transfers can be paused by a single account.".to_string(),
        category: Category::Privileged,
        severity: Severity::Medium,
        pattern: r"function\s+pause\s*\(\s*\)".to_string(),
        deep_scan: false,
        impact: "All token movement can be halted indefinitely.".to_string(),
        recommendation: "Bound pause duration or require a timelock and multisig to pause.".to_string(),
    });

    rules.push(Rule {
        id: "PRIV-005".to_string(),
        name: "Owner-exempt transfer rules".to_string(),
        description: "Transfer restrictions skip the owner.".to_string(),
        category: Category::Privileged,
        severity: Severity::Medium,
        pattern: r"(?:from|sender)\s*!=\s*owner\(\)\s*&&\s*(?:to|recipient)\s*!=\s*owner\(\)".to_string(),
        deep_scan: false,
        impact: "The owner can trade freely while restrictions apply to everyone else.".to_string(),
        recommendation: "Apply the same transfer rules to every account.".to_string(),
    });

    rules.push(Rule {
        id: "PRIV-006".to_string(),
        name: "Blacklist enforced on transfer".to_string(),
        description: "Transfers revert for addresses in a blacklist mapping.".to_string(),
        category: Category::Privileged,
        severity: Severity::High,
        pattern: r"require\s*\(\s*!\s*_?\w*[Bb]lacklist\w*\s*\[".to_string(),
        deep_scan: false,
        impact: "Blacklisted holders cannot move or sell their tokens.".to_string(),
        recommendation: "Drop the blacklist check from the transfer path.".to_string(),
    });

    // ==================== TOKENOMICS ====================

    rules.push(Rule {
        id: "TOKEN-001".to_string(),
        name: "Adjustable fees".to_string(),
        description: "Fee or tax rates can be changed after deployment.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::High,
        pattern: r"(?i)function\s+set\w*(?:fee|tax)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Sell taxes can be raised to 100%, turning the token into a honeypot.".to_string(),
        recommendation: "Hard-code a maximum fee and check it in the setter.".to_string(),
    });

    rules.push(Rule {
        id: "TOKEN-002".to_string(),
        name: "Excessive fee value".to_string(),
        description: "A fee or tax variable is assigned 50 or more.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::High,
        pattern: r"(?i)\w*(?:fee|tax)\w*\s*=\s*(?:[5-9][0-9]|100)\s*;".to_string(),
        deep_scan: false,
        impact: "Most of every trade is taken as a fee.".to_string(),
        recommendation: "Keep fees in single digits and cap them in code.".to_string(),
    });

    rules.push(Rule {
        id: "TOKEN-003".to_string(),
        name: "Public mint function".to_string(),
        description: "A mint function is callable from outside the contract.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::Medium,
        pattern: r"function\s+mint\s*\([^)]*\)\s*(?:external|public)".to_string(),
        deep_scan: false,
        impact: "Supply is not fixed; holders can be diluted.".to_string(),
        recommendation: "Enforce a maximum supply inside mint.".to_string(),
    });

    rules.push(Rule {
        id: "TOKEN-004".to_string(),
        name: "Liquidity removal".to_string(),
        description: "The contract removes liquidity from a DEX pair.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::High,
        pattern: r"removeLiquidity(?:ETH)?(?:WithPermit)?(?:SupportingFeeOnTransferTokens)?\s*\(".to_string(),
        deep_scan: false,
        impact: "Pool liquidity can be pulled, leaving holders unable to sell.".to_string(),
        recommendation: "Lock LP tokens in a third-party locker instead of managing them in the token.".to_string(),
    });

    rules.push(Rule {
        id: "TOKEN-005".to_string(),
        name: "Rebase or burn-rate control".to_string(),
        description: "Supply can be rebased or burn rates changed.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::Medium,
        pattern: r"(?i)function\s+(?:rebase|setBurnRate|setRebase\w*)\s*\(".to_string(),
        deep_scan: false,
        impact: "Balances can shrink without any transfer by the holder.".to_string(),
        recommendation: "Make supply adjustments algorithmic and bounded.".to_string(),
    });

    rules.push(Rule {
        id: "TOKEN-006".to_string(),
        name: "Direct balance overwrite".to_string(),
        description: "A balance entry is assigned directly rather than incremented or decremented.".to_string(),
        category: Category::Tokenomics,
        severity: Severity::Critical,
        pattern: r"_balances\s*\[\s*[\w.]+\s*\]\s*=\s*[\w.]+\s*;".to_string(),
        deep_scan: true,
        impact: "Any holder's balance can be set to an arbitrary value.".to_string(),
        recommendation: "Only change balances through transfer, mint and burn accounting.".to_string(),
    });

    // ==================== PHISHING ====================

    rules.push(Rule {
        id: "PHISH-001".to_string(),
        name: "tx.origin authorization".to_string(),
        description: "Authorization compares against tx.origin.".to_string(),
        category: Category::Phishing,
        severity: Severity::High,
        pattern: r"tx\.origin\s*==|==\s*tx\.origin".to_string(),
        deep_scan: false,
        impact: "A malicious contract the owner interacts with can act with the owner's authority.".to_string(),
        recommendation: "Use msg.sender for authorization.".to_string(),
    });

    rules.push(Rule {
        id: "PHISH-002".to_string(),
        name: "Payable claim function".to_string(),
        description: "A claim or airdrop function accepts ETH.".to_string(),
        category: Category::Phishing,
        severity: Severity::Medium,
        pattern: r"(?i)function\s+(?:claim|airdrop)\w*\s*\([^)]*\)\s*(?:external|public)\s+payable".to_string(),
        deep_scan: false,
        impact: "Users are lured into paying to receive a reward that never arrives.".to_string(),
        recommendation: "Claims should never require sending ETH.".to_string(),
    });

    rules.push(Rule {
        id: "PHISH-003".to_string(),
        name: "Hardcoded address".to_string(),
        description: "A literal address is embedded in the source.".to_string(),
        category: Category::Phishing,
        severity: Severity::Low,
        pattern: r"0x[0-9a-fA-F]{40}".to_string(),
        deep_scan: false,
        impact: "Funds or permissions may flow to an address that is not obviously related to the project.".to_string(),
        recommendation: "Verify every hardcoded address and document what it is.".to_string(),
    });

    rules.push(Rule {
        id: "PHISH-004".to_string(),
        name: "Arbitrary call with caller data".to_string(),
        description: "A low-level call forwards opaque calldata.".to_string(),
        category: Category::Phishing,
        severity: Severity::High,
        pattern: r"\.call\s*(?:\{[^}]*\})?\s*\(\s*(?:data|_data|payload|_payload|callData)\s*\)".to_string(),
        deep_scan: true,
        impact: "The contract can be made to call token contracts and move user allowances.".to_string(),
        recommendation: "Whitelist call targets and selectors.".to_string(),
    });

    // ==================== APPROVALS ====================

    rules.push(Rule {
        id: "APPROVE-001".to_string(),
        name: "Unlimited approval".to_string(),
        description: "An allowance is set to the maximum uint256 value.".to_string(),
        category: Category::Approvals,
        severity: Severity::Medium,
        pattern: r"type\s*\(\s*uint256\s*\)\s*\.max|uint256\s*\(\s*-\s*1\s*\)|2\s*\*\*\s*256\s*-\s*1".to_string(),
        deep_scan: false,
        impact: "A compromised or malicious spender can take the full balance at any time.".to_string(),
        recommendation: "Approve only the amount needed for the operation.".to_string(),
    });

    rules.push(Rule {
        id: "APPROVE-002".to_string(),
        name: "Approval granted on behalf of holder".to_string(),
        description: "_approve is called with a holder as owner and a privileged spender.".to_string(),
        category: Category::Approvals,
        severity: Severity::High,
        pattern: r"_approve\s*\(\s*(?:from|account|holder|_from|user)\s*,\s*(?:msg\.sender|owner\(\)|_owner|address\s*\(\s*this\s*\))".to_string(),
        deep_scan: false,
        impact: "The contract or its owner gains an allowance the holder never signed.".to_string(),
        recommendation: "Only the token owner should be able to create allowances.".to_string(),
    });

    rules.push(Rule {
        id: "APPROVE-003".to_string(),
        name: "Forced transfer".to_string(),
        description: "An admin function moves tokens out of arbitrary accounts.".to_string(),
        category: Category::Approvals,
        severity: Severity::Critical,
        pattern: r"(?i)function\s+\w*(?:forceTransfer|adminTransfer|transferFromAny|sweepTokens)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Holder balances can be taken without any approval.".to_string(),
        recommendation: "Remove forced transfer paths.".to_string(),
    });

    // ==================== TWO-FACTOR ====================

    rules.push(Rule {
        id: "2FA-001".to_string(),
        name: "Single-step ownership transfer".to_string(),
        description: "Ownership changes in one call with no acceptance step.".to_string(),
        category: Category::TwoFactor,
        severity: Severity::Medium,
        pattern: r"function\s+transferOwnership\s*\([^)]*\)[^{;]*\{[^}]*_?owner\s*=".to_string(),
        deep_scan: false,
        impact: "A single compromised key or typo hands over full control.".to_string(),
        recommendation: "Use a two-step transfer (Ownable2Step) with explicit acceptance.".to_string(),
    });

    rules.push(Rule {
        id: "2FA-002".to_string(),
        name: "Emergency function".to_string(),
        description: "Emergency functions execute immediately.".to_string(),
        category: Category::TwoFactor,
        severity: Severity::High,
        pattern: r"(?i)function\s+emergency\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Emergency powers are a common cover for draining funds.".to_string(),
        recommendation: "Require multisig approval and a timelock for emergency actions.".to_string(),
    });

    rules.push(Rule {
        id: "2FA-003".to_string(),
        name: "Critical address setter".to_string(),
        description: "Router, pair, treasury or admin addresses can be replaced by one call.".to_string(),
        category: Category::TwoFactor,
        severity: Severity::Medium,
        pattern: r"function\s+set(?:Router|Pair|Treasury|MarketingWallet|DevWallet|FeeWallet|Admin|Operator)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "Swaps or fees can be redirected to an attacker-controlled address.".to_string(),
        recommendation: "Put critical address changes behind a timelock.".to_string(),
    });

    rules.push(Rule {
        id: "2FA-004".to_string(),
        name: "Raw signature recovery".to_string(),
        description: "ecrecover is used directly.".to_string(),
        category: Category::TwoFactor,
        severity: Severity::Medium,
        pattern: r"ecrecover\s*\(".to_string(),
        deep_scan: true,
        impact: "Missing nonce or malleability checks allow signatures to be replayed.".to_string(),
        recommendation: "Use OpenZeppelin ECDSA with nonces and EIP-712 domains.".to_string(),
    });

    // ==================== MEV ====================

    rules.push(Rule {
        id: "MEV-001".to_string(),
        name: "Swap without slippage protection".to_string(),
        description: "A swap passes zero as the minimum output amount.".to_string(),
        category: Category::Mev,
        severity: Severity::High,
        pattern: r"swapExact\w*\s*(?:\{[^}]*\})?\s*\(\s*(?:[^,;()]+,\s*)?0\s*,".to_string(),
        deep_scan: false,
        impact: "Contract swaps can be sandwiched for the full trade value.".to_string(),
        recommendation: "Compute a minimum output from an oracle or a caller-provided bound.".to_string(),
    });

    rules.push(Rule {
        id: "MEV-002".to_string(),
        name: "Deadline set to current block".to_string(),
        description: "block.timestamp is passed as a swap deadline.".to_string(),
        category: Category::Mev,
        severity: Severity::Medium,
        pattern: r",\s*block\.timestamp\s*\)".to_string(),
        deep_scan: false,
        impact: "The transaction can be held and executed whenever it is most profitable for a validator.".to_string(),
        recommendation: "Pass a caller-supplied deadline.".to_string(),
    });

    rules.push(Rule {
        id: "MEV-003".to_string(),
        name: "Timestamp-dependent logic".to_string(),
        description: "Control flow compares against block.timestamp.".to_string(),
        category: Category::Mev,
        severity: Severity::Low,
        pattern: r"block\.timestamp\s*(?:[<>]=?|==|%)".to_string(),
        deep_scan: false,
        impact: "Validators can shift timestamps slightly to change outcomes.".to_string(),
        recommendation: "Avoid tight timestamp windows for value-bearing decisions.".to_string(),
    });

    rules.push(Rule {
        id: "MEV-004".to_string(),
        name: "Weak on-chain randomness".to_string(),
        description: "Randomness is derived from block fields.".to_string(),
        category: Category::Mev,
        severity: Severity::High,
        pattern: r"keccak256\s*\(\s*abi\.encodePacked\s*\([^;]*(?:block\.(?:timestamp|difficulty|prevrandao|number)|blockhash)".to_string(),
        deep_scan: true,
        impact: "Validators and searchers can predict or steer the outcome.".to_string(),
        recommendation: "Use a verifiable randomness source such as Chainlink VRF.".to_string(),
    });

    // ==================== MULTISIG ====================

    rules.push(Rule {
        id: "MULTISIG-001".to_string(),
        name: "Mutable signature threshold".to_string(),
        description: "The number of required confirmations can be changed.".to_string(),
        category: Category::Multisig,
        severity: Severity::High,
        pattern: r"(?i)function\s+(?:changeRequirement|setThreshold|changeThreshold|setRequired)\w*\s*\(".to_string(),
        deep_scan: false,
        impact: "The threshold can be lowered to one, reducing the wallet to a single key.".to_string(),
        recommendation: "Only allow threshold changes through a multisig-approved, timelocked transaction.".to_string(),
    });

    rules.push(Rule {
        id: "MULTISIG-002".to_string(),
        name: "Signer management".to_string(),
        description: "Owners or signers can be added or removed.".to_string(),
        category: Category::Multisig,
        severity: Severity::Medium,
        pattern: r"(?i)function\s+(?:addOwner|removeOwner|replaceOwner|addSigner|removeSigner)\s*\(".to_string(),
        deep_scan: false,
        impact: "A colluding minority can replace honest signers.".to_string(),
        recommendation: "Require the full threshold and a delay for signer changes.".to_string(),
    });

    rules.push(Rule {
        id: "MULTISIG-003".to_string(),
        name: "Threshold of one".to_string(),
        description: "The confirmation threshold is set to 1.".to_string(),
        category: Category::Multisig,
        severity: Severity::High,
        pattern: r"(?i)\b(?:required|threshold|numConfirmationsRequired)\s*=\s*1\s*;".to_string(),
        deep_scan: false,
        impact: "Any single signer can move all funds.".to_string(),
        recommendation: "Use a threshold of at least two and a majority of signers.".to_string(),
    });

    rules.push(Rule {
        id: "MULTISIG-004".to_string(),
        name: "Direct execution call".to_string(),
        description: "executeTransaction performs a low-level call.".to_string(),
        category: Category::Multisig,
        severity: Severity::Medium,
        pattern: r"function\s+executeTransaction\s*\([^)]*\)[^{;]*\{[^}]*\.call\s*\{".to_string(),
        deep_scan: true,
        impact: "If the confirmation count is not checked, one signer can execute anything.".to_string(),
        recommendation: "Check the confirmation count and mark the transaction executed before calling out.".to_string(),
    });

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn rule(id: &str) -> regex::Regex {
        let rules = builtin_rules();
        let r = rules.iter().find(|r| r.id == id).unwrap();
        r.compile().unwrap().regex
    }

    #[test]
    fn test_builtin_rules_compile() {
        for rule in builtin_rules() {
            assert!(
                rule.compile().is_ok(),
                "Rule {} failed to compile: {}",
                rule.id,
                rule.pattern
            );
        }
    }

    #[test]
    fn test_rule_ids_unique() {
        let rules = builtin_rules();
        let ids: HashSet<_> = rules.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn test_every_category_has_a_default_rule() {
        let rules = builtin_rules();
        for category in Category::ALL {
            assert!(
                rules.iter().any(|r| r.category == category && !r.deep_scan),
                "no default rule for {}",
                category.tag()
            );
        }
        assert!(rules.iter().any(|r| r.deep_scan));
    }

    #[test]
    fn test_hidden_owner_detection() {
        let re = rule("BACKDOOR-002");
        assert!(re.is_match(r#"require(msg.sender == _hiddenOwner, "no");"#));
        assert!(re.is_match("require( msg.sender==secretAdmin );"));
        assert!(!re.is_match("require(msg.sender == owner());"));
    }

    #[test]
    fn test_direct_mint_spans_body() {
        let re = rule("BACKDOOR-005");
        let src = "function executeMint(address to, uint256 amount) external {\n    require(ok);\n    _mint(to, amount);\n}";
        assert!(re.is_match(src));
        assert!(!re.is_match("function mint(address to) external onlyOwner { emit Minted(to); }"));
    }

    #[test]
    fn test_fee_rules() {
        let setter = rule("TOKEN-001");
        assert!(setter.is_match("function setSellFee(uint256 fee) external onlyOwner {"));
        assert!(setter.is_match("function setTaxes(uint256 a) external"));

        let excessive = rule("TOKEN-002");
        assert!(excessive.is_match("sellFee = 99;"));
        assert!(excessive.is_match("_taxRate = 100;"));
        assert!(!excessive.is_match("sellFee = 5;"));
    }

    #[test]
    fn test_slippage_rule() {
        let re = rule("MEV-001");
        assert!(re.is_match(
            "router.swapExactTokensForETHSupportingFeeOnTransferTokens(tokenAmount, 0, path, address(this), block.timestamp);"
        ));
        assert!(re.is_match("router.swapExactETHForTokens{value: msg.value}(0, path, to, deadline);"));
        assert!(!re.is_match("router.swapExactTokensForTokens(amountIn, minOut, path, to, deadline);"));
    }

    #[test]
    fn test_multisig_threshold_of_one() {
        let re = rule("MULTISIG-003");
        assert!(re.is_match("required = 1;"));
        assert!(!re.is_match("required = 10;"));
    }

    #[test]
    fn test_single_step_ownership() {
        let re = rule("2FA-001");
        assert!(re.is_match("function transferOwnership(address newOwner) public onlyOwner {\n    _owner = newOwner;\n}"));
    }
}
