use ethers::contract::abigen;

abigen!(
    Manager,
    r#"[
        function vaults(address token) external view returns (address)
    ]"#,
);
