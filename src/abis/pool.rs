use alloy::sol;

sol! {
    event PoolUpdate(uint128 indexed token0Balance, uint128 indexed token1Balance, int24 tick, uint256 token0Delta, uint256 token1Delta);
}
