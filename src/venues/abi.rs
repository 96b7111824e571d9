// Venue ABI definitions
// Solidity interfaces for the venues the router emits invocations for and
// reads quotes from
//
// Numan Thabit 2025 Nov

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    contract UniV3Router {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }
        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }
        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams calldata params) external payable returns (uint256 amountOut);
    }

    #[derive(Debug, PartialEq, Eq)]
    contract UniV3Quoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
        function quoteExactInput(bytes path, uint256 amountIn) external returns (uint256 amountOut);
    }

    #[derive(Debug, PartialEq, Eq)]
    contract StableSwapPool {
        function exchange(int128 i, int128 j, uint256 dx, uint256 min_dy) external payable returns (uint256 received);
        function exchange_underlying(int128 i, int128 j, uint256 dx, uint256 min_dy) external payable returns (uint256 received);
        function get_dy(int128 i, int128 j, uint256 dx) external view returns (uint256 dy);
        function get_dy_underlying(int128 i, int128 j, uint256 dx) external view returns (uint256 dy);
    }

    #[derive(Debug, PartialEq, Eq)]
    contract NativeStaking {
        function submit(address referral) external payable returns (uint256 shares);
    }

    #[derive(Debug, PartialEq, Eq)]
    contract Erc4626Vault {
        function deposit(uint256 assets, address receiver) external returns (uint256 shares);
    }

    #[derive(Debug, PartialEq, Eq)]
    contract WrappedNative {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
    }
}
