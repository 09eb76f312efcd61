use ethers::contract::abigen;

abigen!(
    Vault,
    r#"[
        function deposit(uint256 amount, address receiver) external
        function asset() external view returns (address)
    ]"#,
);
